use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

/// Why a piece of model text could not be read as a recommendation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("response contains no `--` recommendation delimiter")]
    MissingDelimiter,

    #[error("recommendation segment has no `/` separator: {0:?}")]
    MissingSeparator(String),

    #[error("recommendation segment has an empty listing id")]
    EmptyIdentifier,

    #[error("recommendation for listing text {0:?} has an empty explanation")]
    EmptyExplanation(String),

    #[error("listing id {text:?} is not an integer: {source}")]
    InvalidIdentifier {
        text: String,
        #[source]
        source: ParseIntError,
    },
}

/// The candidate's listing id does not exist in the detailed dataset.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("listing {0} does not exist in the detailed dataset")]
pub struct NotFound(pub u64);

/// Failure of a single generation attempt. Every variant is retryable.
#[derive(Error, Debug)]
pub enum AttemptError {
    #[error("malformed model response: {0}")]
    Format(#[from] FormatError),

    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("generation call failed: {0}")]
    Generation(String),

    #[error("generation call timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures while loading the listings datasets.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Failed to read dataset {path}: {source}")]
    DatasetIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse dataset {path}: {source}")]
    DatasetFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AdvisorError>;
