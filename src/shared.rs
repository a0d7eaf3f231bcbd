use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;
use crate::event::SignalingHandle;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingHandle,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(signaling: SignalingHandle, config: Arc<AppConfig>) -> Self {
        Self { signaling, config }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_error_status_codes() {
        let cases = [
            (
                AppError::InvalidRequest("room is required".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Unavailable("stopped".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = AppError::InvalidRequest("room is required".to_string()).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(value["error"], "room is required");
    }
}
