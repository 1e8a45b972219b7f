use axum::{extract::State, http::StatusCode, Json};
use crate::models::{ErrorResponse, HealthResponse, MessageResponse};
use crate::state::AppState;
use tracing::{debug, error};

/// Welcome message at the root path
pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new("Welcome to the API!"))
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Server is running".to_string(),
    })
}

/// Readiness check endpoint, reachable only while the store answers
pub async fn ready_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    debug!("Readiness check requested");
    if let Err(e) = state.store.ping().await {
        error!("Readiness check failed: {}", e);
        return Err(ErrorResponse::reply(StatusCode::SERVICE_UNAVAILABLE, "Store is unreachable"));
    }
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        message: "Service is ready".to_string(),
    }))
}
