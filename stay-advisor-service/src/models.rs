use serde::{Deserialize, Serialize};
use stay_advisor::{RecommendationResult, ValidatedRecommendation};

pub const NEED_MORE_INFO_MESSAGE: &str = "Please provide more information!";
/// Sent on failure in place of the rejection reason, which may quote model output.
pub const FAILED_MESSAGE: &str = "Unable to produce a recommendation. Please try again.";

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub request_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<ValidatedRecommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

impl RecommendResponse {
    pub fn from_result(request_id: String, result: RecommendationResult) -> Self {
        match result {
            RecommendationResult::Recommended(recommendation) => Self {
                request_id,
                status: "recommended",
                recommendation: Some(recommendation),
                message: None,
                attempts: None,
            },
            RecommendationResult::NeedMoreInfo => Self {
                request_id,
                status: "need_more_info",
                recommendation: None,
                message: Some(NEED_MORE_INFO_MESSAGE.to_string()),
                attempts: None,
            },
            RecommendationResult::Failed { attempts, .. } => Self {
                request_id,
                status: "failed",
                recommendation: None,
                message: Some(FAILED_MESSAGE.to_string()),
                attempts: Some(attempts),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
