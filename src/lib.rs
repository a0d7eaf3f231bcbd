// Library crate for the signaling server
// This file exposes the public API for integration tests

pub mod config;
pub mod connection;
pub mod event;
pub mod health;
pub mod room;
pub mod shared;
pub mod signaling;
pub mod websockets;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// Re-export commonly used types for easier access in tests
pub use config::AppConfig;
pub use connection::{ConnectionId, Membership};
pub use event::{EventDispatcher, SignalingHandle};
pub use room::{JoinRoomResult, LeaveRoomResult, RoomRegistry, RoomState};
pub use shared::{AppError, AppState};
pub use signaling::{DisconnectReport, RouteOutcome, SignalMessage, SignalingState};
pub use websockets::{MessageType, SignalingMessageHandler, WebSocketMessage};

/// Builds the HTTP router: WebSocket signaling endpoint plus health check
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/ws", get(websockets::websocket_handler))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
