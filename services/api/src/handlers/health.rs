//! Health check endpoint

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Report service liveness and store reachability
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let store_up = state.store.health_check().await.unwrap_or_else(|e| {
        error!("Store health check failed: {}", e);
        false
    });

    if !store_up {
        return Err(ApiError::ExternalDependency(
            "store is unreachable".to_string(),
        ));
    }

    Ok(Json(json!({
        "status": "ok",
        "service": "api-service",
        "store": "up"
    })))
}
