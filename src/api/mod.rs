use std::time::Duration;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::{
    TripScoutError, VERSION,
    aggregation::Aggregator,
    models::{CandidateDestination, DestinationEvidence},
    planner::{RecommendationRequest, RecommendationService},
};

const DYNAMIC_RECOMMENDATIONS: &str = "get_dynamic_recommendations";

#[derive(Clone)]
pub struct AppState {
    aggregator: Aggregator,
    recommender: Option<RecommendationService>,
    aggregation_timeout: Duration,
}

impl AppState {
    pub fn new(aggregator: Aggregator, aggregation_timeout: Duration) -> Self {
        Self {
            aggregator,
            recommender: None,
            aggregation_timeout,
        }
    }

    #[must_use]
    pub fn with_recommender(mut self, recommender: RecommendationService) -> Self {
        self.recommender = Some(recommender);
        self
    }
}

#[derive(Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<TripScoutError> for ApiError {
    fn from(err: TripScoutError) -> Self {
        match err {
            TripScoutError::Validation { .. } => {
                warn!("Rejected request: {}", err);
                Self::new(StatusCode::BAD_REQUEST, err.user_message())
            }
            _ => {
                error!("Request failed: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/aggregate", post(aggregate))
        .route("/recommendations", post(recommendations))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: VERSION.to_string(),
    })
}

async fn aggregate(
    State(state): State<AppState>,
    Json(candidates): Json<Vec<CandidateDestination>>,
) -> Result<Json<Vec<DestinationEvidence>>, ApiError> {
    let evidence = tokio::time::timeout(
        state.aggregation_timeout,
        state.aggregator.aggregate(&candidates),
    )
    .await
    .map_err(|_| {
        warn!(
            "Aggregation of {} candidates timed out after {:?}",
            candidates.len(),
            state.aggregation_timeout
        );
        ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Pricing aggregation timed out")
    })??;

    Ok(Json(evidence))
}

async fn recommendations(
    State(state): State<AppState>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<Value>, ApiError> {
    if request.action != DYNAMIC_RECOMMENDATIONS {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Invalid action"));
    }

    let Some(recommender) = state.recommender.as_ref() else {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "No planner configured",
        ));
    };

    let data: RecommendationRequest = serde_json::from_value(request.data)
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, format!("Invalid data: {e}")))?;

    Ok(Json(recommender.recommend(&data).await?))
}
