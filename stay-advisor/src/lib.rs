pub mod config;
pub mod error;
pub mod generation;
pub mod listing;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod testing;
pub mod validator;

// Re-export commonly used types
pub use config::{AdvisorConfig, LlmProvider};
pub use error::{AdvisorError, AttemptError, FormatError, NotFound, Result};
pub use generation::{Generator, RigGenerator};
pub use listing::{DetailedListings, ListingRecord, SummaryTable};
pub use orchestrator::{RecommendationOrchestrator, RecommendationResult};
pub use parser::{Candidate, is_refusal, parse_response};
pub use validator::{ValidatedRecommendation, validate};
