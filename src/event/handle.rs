use tokio::sync::{mpsc, oneshot};
use tracing::{instrument, warn};

use super::events::SignalingEvent;
use crate::connection::ConnectionId;
use crate::shared::AppError;
use crate::signaling::{DisconnectReport, RouteOutcome, SignalMessage, SignalingStats};
use crate::websockets::{JoinPayload, LeavePayload};

/// Cloneable handle to the event dispatcher
///
/// This is the only way the rest of the application touches signaling state.
#[derive(Debug, Clone)]
pub struct SignalingHandle {
    sender: mpsc::Sender<SignalingEvent>,
}

impl SignalingHandle {
    pub fn new(sender: mpsc::Sender<SignalingEvent>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> SignalingEvent,
    ) -> Result<T, AppError> {
        let (reply, response) = oneshot::channel();
        self.sender.send(build(reply)).await.map_err(|_| {
            warn!("Event dispatcher is not running");
            AppError::Unavailable("signaling dispatcher stopped".to_string())
        })?;
        response
            .await
            .map_err(|_| AppError::Unavailable("signaling dispatcher dropped reply".to_string()))
    }

    pub async fn connect(
        &self,
        sender: mpsc::Sender<String>,
    ) -> Result<ConnectionId, AppError> {
        self.request(|reply| SignalingEvent::Connect { sender, reply })
            .await
    }

    #[instrument(skip(self, request))]
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        request: JoinPayload,
        request_id: Option<String>,
    ) -> Result<Vec<String>, AppError> {
        self.request(|reply| SignalingEvent::Join {
            connection_id,
            request,
            request_id,
            reply,
        })
        .await?
    }

    #[instrument(skip(self, request))]
    pub async fn leave(
        &self,
        connection_id: ConnectionId,
        request: LeavePayload,
        request_id: Option<String>,
    ) -> Result<(), AppError> {
        self.request(|reply| SignalingEvent::Leave {
            connection_id,
            request,
            request_id,
            reply,
        })
        .await
    }

    pub async fn route(
        &self,
        connection_id: ConnectionId,
        message: SignalMessage,
        request_id: Option<String>,
    ) -> Result<RouteOutcome, AppError> {
        self.request(|reply| SignalingEvent::Message {
            connection_id,
            message,
            request_id,
            reply,
        })
        .await?
    }

    #[instrument(skip(self))]
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Result<DisconnectReport, AppError> {
        self.request(|reply| SignalingEvent::Disconnect {
            connection_id,
            reply,
        })
        .await
    }

    pub async fn list_participants(&self, room_id: &str) -> Result<Vec<String>, AppError> {
        let room_id = room_id.to_string();
        self.request(|reply| SignalingEvent::ListParticipants { room_id, reply })
            .await
    }

    pub async fn stats(&self) -> Result<SignalingStats, AppError> {
        self.request(|reply| SignalingEvent::Stats { reply }).await
    }
}
