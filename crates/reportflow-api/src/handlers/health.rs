//! Health check handlers.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let database_connected = match state.stores.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(error = %e, "Job store health check failed");
            false
        }
    };

    let storage_available = match state.storage.health_check().await {
        Ok(up) => up,
        Err(e) => {
            warn!(error = %e, "Artifact storage health check failed");
            false
        }
    };

    let healthy = database_connected && storage_available;
    Json(ApiResponse::ok(HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: state.stores.backend_name().to_string(),
        database_connected,
        storage: state.storage.provider_type().to_string(),
        storage_available,
        engine: state.engine.name().to_string(),
    }))
}
