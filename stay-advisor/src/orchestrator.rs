use chrono::Local;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::AdvisorConfig;
use crate::error::AttemptError;
use crate::generation::{Generator, RigGenerator};
use crate::listing::{DetailedListings, SummaryTable};
use crate::parser::{is_refusal, parse_response};
use crate::prompt::{SYSTEM_INSTRUCTIONS, build_user_prompt};
use crate::validator::{ValidatedRecommendation, validate};

/// Terminal outcome of one query. Every request ends in exactly one of these.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationResult {
    Recommended(ValidatedRecommendation),
    /// The model explicitly refused: the query lacks information or nothing fits.
    NeedMoreInfo,
    /// Every attempt was rejected.
    Failed { attempts: u32, reason: String },
}

impl RecommendationResult {
    pub fn is_recommended(&self) -> bool {
        matches!(self, RecommendationResult::Recommended(_))
    }
}

/// What a single accepted reply amounts to.
enum Decision {
    Recommend(ValidatedRecommendation),
    NeedMoreInfo,
}

/// Runs the generate → parse → validate loop with a bounded retry budget.
pub struct RecommendationOrchestrator {
    generator: Arc<dyn Generator>,
    max_attempts: u32,
    generation_timeout: Duration,
}

impl RecommendationOrchestrator {
    pub fn new(generator: Arc<dyn Generator>, config: &AdvisorConfig) -> Self {
        Self::with_retry_policy(generator, config.max_attempts, config.generation_timeout)
    }

    /// Build the production orchestrator around a `rig` generator.
    pub fn from_config(config: &AdvisorConfig) -> Self {
        info!(model = %config.model, provider = ?config.provider, "Creating recommendation orchestrator");
        Self::new(Arc::new(RigGenerator::new(config)), config)
    }

    /// `max_attempts` counts the first attempt; it is raised to 1 if zero.
    pub fn with_retry_policy(
        generator: Arc<dyn Generator>,
        max_attempts: u32,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            generator,
            max_attempts: max_attempts.max(1),
            generation_timeout,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Recommend a single listing from `detailed` for `query`.
    ///
    /// Never fails: malformed replies, unknown listings, generation errors
    /// and timeouts are retried until the budget is spent, after which
    /// [`RecommendationResult::Failed`] is returned.
    pub async fn get_recommendation(
        &self,
        summary: &SummaryTable,
        detailed: &DetailedListings,
        query: &str,
    ) -> RecommendationResult {
        info!(query = %query, listings = detailed.len(), "Starting recommendation");

        let prompt = build_user_prompt(summary, query, Local::now().date_naive());
        let mut last_error: Option<AttemptError> = None;

        for attempt in 1..=self.max_attempts {
            info!(
                attempt,
                max_attempts = self.max_attempts,
                "Generating recommendation (attempt {} of {})",
                attempt,
                self.max_attempts
            );

            match self.attempt(&prompt, detailed).await {
                Ok(Decision::Recommend(recommendation)) => {
                    info!(
                        attempt,
                        listing_id = recommendation.identifier(),
                        "Recommendation validated"
                    );
                    return RecommendationResult::Recommended(recommendation);
                }
                Ok(Decision::NeedMoreInfo) => {
                    info!(attempt, "Model asked for more information");
                    return RecommendationResult::NeedMoreInfo;
                }
                Err(e) => {
                    warn!(attempt, reason = %e, "Attempt rejected");
                    last_error = Some(e);
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        error!(
            attempts = self.max_attempts,
            reason = %reason,
            "Retry budget exhausted without a valid recommendation"
        );
        RecommendationResult::Failed {
            attempts: self.max_attempts,
            reason,
        }
    }

    async fn attempt(
        &self,
        prompt: &str,
        detailed: &DetailedListings,
    ) -> Result<Decision, AttemptError> {
        let raw = tokio::time::timeout(
            self.generation_timeout,
            self.generator.generate(SYSTEM_INSTRUCTIONS, prompt),
        )
        .await
        .map_err(|_| AttemptError::Timeout(self.generation_timeout))?
        .map_err(|e| AttemptError::Generation(e.to_string()))?;

        debug!(raw_answer = %raw, "Raw model answer");

        if is_refusal(&raw) {
            return Ok(Decision::NeedMoreInfo);
        }

        let candidate = parse_response(&raw)?;
        let recommendation = validate(candidate, detailed)?;
        Ok(Decision::Recommend(recommendation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, NotFound};
    use crate::listing::ListingRecord;
    use crate::testing::ScriptedGenerator;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn detailed() -> DetailedListings {
        DetailedListings::new(vec![
            ListingRecord::new(123456, "https://rooms/123456", "https://img/123456.jpg"),
            ListingRecord::new(5, "https://rooms/5", "https://img/5.jpg"),
        ])
    }

    fn orchestrator(
        generator: &Arc<ScriptedGenerator>,
        max_attempts: u32,
    ) -> RecommendationOrchestrator {
        RecommendationOrchestrator::with_retry_policy(generator.clone(), max_attempts, TIMEOUT)
    }

    #[tokio::test]
    async fn test_valid_reply_is_recommended() {
        let generator = Arc::new(ScriptedGenerator::always("-- 123456/it is great"));
        let result = orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "a flat in Barcelona")
            .await;

        match result {
            RecommendationResult::Recommended(recommendation) => {
                assert_eq!(recommendation.identifier(), 123456);
                assert_eq!(recommendation.explanation(), "it is great");
                assert_eq!(recommendation.url(), "https://rooms/123456");
                assert_eq!(recommendation.image(), "https://img/123456.jpg");
            }
            other => panic!("expected a recommendation, got {:?}", other),
        }
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_refusal_is_need_more_info() {
        let generator = Arc::new(ScriptedGenerator::always("False"));
        let result = orchestrator(&generator, 3)
            .get_recommendation(&SummaryTable::default(), &detailed(), "somewhere nice")
            .await;

        assert_eq!(result, RecommendationResult::NeedMoreInfo);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_garbage_fails_after_exact_budget() {
        let generator = Arc::new(ScriptedGenerator::always("garbage with no delimiter"));
        let result = orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "anything")
            .await;

        assert_eq!(
            result,
            RecommendationResult::Failed {
                attempts: 2,
                reason: AttemptError::Format(FormatError::MissingDelimiter).to_string(),
            }
        );
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_listing_is_retried_then_accepted() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_reply("-- 777/invented listing")
                .then_reply("-- 5/cheap / near beach"),
        );
        let result = orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "cheap, near the beach")
            .await;

        match result {
            RecommendationResult::Recommended(recommendation) => {
                assert_eq!(recommendation.identifier(), 5);
                assert_eq!(recommendation.explanation(), "cheap / near beach");
            }
            other => panic!("expected a recommendation, got {:?}", other),
        }
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_retry_uses_identical_prompt() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_reply("-- nope")
                .then_reply("-- 5/fine"),
        );
        orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "a room")
            .await;

        let prompts = generator.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }

    #[tokio::test]
    async fn test_every_attempt_sends_system_instructions() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_reply("no delimiter here")
                .then_reply("-- 5/fine"),
        );
        orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "a room")
            .await;

        let system_prompts = generator.system_prompts();
        assert_eq!(system_prompts.len(), 2);
        assert!(system_prompts.iter().all(|system| system == SYSTEM_INSTRUCTIONS));
    }

    #[tokio::test]
    async fn test_not_found_reported_when_budget_runs_out() {
        let generator = Arc::new(ScriptedGenerator::always("-- 999/does not exist"));
        let result = orchestrator(&generator, 1)
            .get_recommendation(&SummaryTable::default(), &detailed(), "a room")
            .await;

        assert_eq!(
            result,
            RecommendationResult::Failed {
                attempts: 1,
                reason: AttemptError::NotFound(NotFound(999)).to_string(),
            }
        );
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_generation_error_is_retried() {
        let generator = Arc::new(
            ScriptedGenerator::new()
                .then_fail("connection reset")
                .then_reply("-- 123456/spacious"),
        );
        let result = orchestrator(&generator, 2)
            .get_recommendation(&SummaryTable::default(), &detailed(), "a loft")
            .await;

        assert!(result.is_recommended());
        assert_eq!(generator.calls(), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failed_attempt() {
        let generator = Arc::new(ScriptedGenerator::new().then_stall(Duration::from_secs(5)));
        let orchestrator = RecommendationOrchestrator::with_retry_policy(
            generator.clone(),
            2,
            Duration::from_millis(20),
        );
        let result = orchestrator
            .get_recommendation(&SummaryTable::default(), &detailed(), "a loft")
            .await;

        match result {
            RecommendationResult::Failed { attempts, reason } => {
                assert_eq!(attempts, 2);
                assert!(reason.contains("timed out"), "unexpected reason: {}", reason);
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(generator.calls(), 2);
    }

    #[test]
    fn test_zero_attempts_is_raised_to_one() {
        let generator = Arc::new(ScriptedGenerator::always("False"));
        assert_eq!(orchestrator(&generator, 0).max_attempts(), 1);
    }

    #[test]
    fn test_result_serialization_is_tagged() {
        let failed = RecommendationResult::Failed {
            attempts: 2,
            reason: "bad".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            serde_json::json!({"status": "failed", "attempts": 2, "reason": "bad"})
        );
        assert_eq!(
            serde_json::to_value(RecommendationResult::NeedMoreInfo).unwrap(),
            serde_json::json!({"status": "need_more_info"})
        );
    }
}
