use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::shared::{AppError, AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub rooms: usize,
    pub connections: usize,
}

/// HTTP handler confirming the service is reachable
///
/// GET /health
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let stats = state.signaling.stats().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        rooms: stats.rooms,
        connections: stats.connections,
    }))
}
