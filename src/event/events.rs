use tokio::sync::{mpsc, oneshot};

use crate::connection::ConnectionId;
use crate::shared::AppError;
use crate::signaling::{DisconnectReport, RouteOutcome, SignalMessage, SignalingStats};
use crate::websockets::{JoinPayload, LeavePayload};

/// Inbound events processed one at a time by the dispatcher
///
/// Each event carries a reply channel. A dropped reply receiver is fine: the
/// event is still applied.
#[derive(Debug)]
pub enum SignalingEvent {
    /// A WebSocket upgrade completed
    Connect {
        sender: mpsc::Sender<String>,
        reply: oneshot::Sender<ConnectionId>,
    },

    /// A connection asked to join a room as a participant
    Join {
        connection_id: ConnectionId,
        request: JoinPayload,
        request_id: Option<String>,
        reply: oneshot::Sender<Result<Vec<String>, AppError>>,
    },

    /// A connection asked to release one of its memberships
    Leave {
        connection_id: ConnectionId,
        request: LeavePayload,
        request_id: Option<String>,
        reply: oneshot::Sender<()>,
    },

    /// A connection sent an offer, answer, candidate or generic signal
    Message {
        connection_id: ConnectionId,
        message: SignalMessage,
        request_id: Option<String>,
        reply: oneshot::Sender<Result<RouteOutcome, AppError>>,
    },

    /// The transport closed
    Disconnect {
        connection_id: ConnectionId,
        reply: oneshot::Sender<DisconnectReport>,
    },

    ListParticipants {
        room_id: String,
        reply: oneshot::Sender<Vec<String>>,
    },

    Stats {
        reply: oneshot::Sender<SignalingStats>,
    },
}

impl SignalingEvent {
    /// Get a human-readable description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            SignalingEvent::Connect { .. } => "connect",
            SignalingEvent::Join { .. } => "join",
            SignalingEvent::Leave { .. } => "leave",
            SignalingEvent::Message { .. } => "message",
            SignalingEvent::Disconnect { .. } => "disconnect",
            SignalingEvent::ListParticipants { .. } => "list_participants",
            SignalingEvent::Stats { .. } => "stats",
        }
    }
}
