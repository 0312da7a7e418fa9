use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::{Next, from_fn},
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use stay_advisor::{
    AdvisorConfig, DetailedListings, RecommendationOrchestrator, SummaryTable,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Instrument, error, info};
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::models::{ErrorResponse, RecommendRequest, RecommendResponse};
use crate::store::{InMemoryRecommendationStore, RecommendationStore, StoredRecommendation};

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn error_response(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<RecommendationOrchestrator>,
    pub summary: Arc<SummaryTable>,
    pub detailed: Arc<DetailedListings>,
    pub store: Arc<dyn RecommendationStore>,
}

/// Load both datasets and build the production router.
pub fn create_app(
    service_config: &ServiceConfig,
    advisor_config: &AdvisorConfig,
) -> anyhow::Result<Router> {
    let summary = SummaryTable::from_json_file(&service_config.summary_dataset_path)?;
    let detailed = DetailedListings::from_json_file(&service_config.detailed_dataset_path)?;

    let state = AppState {
        orchestrator: Arc::new(RecommendationOrchestrator::from_config(advisor_config)),
        summary: Arc::new(summary),
        detailed: Arc::new(detailed),
        store: Arc::new(InMemoryRecommendationStore::with_capacity(
            service_config.store_capacity,
        )),
    };
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommend", post(recommend))
        .route("/recommendations/{request_id}", get(get_recommendation))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(correlation_id_middleware))
        .with_state(state)
}

/// Tag every request with a correlation id and run it inside a span carrying it
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header = HeaderValue::from_str(&correlation_id).ok();

    if let Some(value) = &header {
        request.headers_mut().insert("x-correlation-id", value.clone());
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    let mut response = next.run(request).instrument(span).await;

    if let Some(value) = header {
        response.headers_mut().insert("x-correlation-id", value);
    }
    response
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339()
    }))
}

async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> ApiResult<RecommendResponse> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "query is required"));
    }

    let request_id = Uuid::new_v4().to_string();
    info!(request_id = %request_id, "Received recommendation request: {}", query);

    let result = state
        .orchestrator
        .get_recommendation(&state.summary, &state.detailed, query)
        .await;

    let record = StoredRecommendation {
        request_id: request_id.clone(),
        query: query.to_string(),
        result: result.clone(),
        created_at: Utc::now(),
    };
    // The caller still gets the answer if it could not be stored.
    if let Err(e) = state.store.save(record).await {
        error!(request_id = %request_id, "Failed to store recommendation: {}", e);
    }

    Ok(Json(RecommendResponse::from_result(request_id, result)))
}

async fn get_recommendation(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> ApiResult<StoredRecommendation> {
    match state.store.get(&request_id).await {
        Ok(Some(record)) => Ok(Json(record)),
        Ok(None) => Err(error_response(
            StatusCode::NOT_FOUND,
            &format!("recommendation {} not found", request_id),
        )),
        Err(e) => {
            error!(request_id = %request_id, "Failed to read recommendation: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read recommendation",
            ))
        }
    }
}
