use tracing::{debug, instrument};

use super::state::SignalingState;
use crate::connection::ConnectionId;
use crate::shared::AppError;
use crate::websockets::{MessageType, SignalPayload, WebSocketMessage};

/// An offer, answer, candidate or generic signal on its way between peers
#[derive(Debug, Clone, PartialEq)]
pub struct SignalMessage {
    pub kind: MessageType,
    pub payload: SignalPayload,
}

impl SignalMessage {
    pub fn new(kind: MessageType, mut payload: SignalPayload) -> Self {
        // An empty receiver means "no receiver"
        if payload.receiver.as_deref() == Some("") {
            payload.receiver = None;
        }
        Self { kind, payload }
    }
}

/// How a routed message was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Queued for this many connections
    Delivered(usize),
    /// Direct receiver not present in the room; dropped silently
    Dropped,
}

/// Relays a signaling message from one connection
///
/// With a receiver the message goes only to connections bound to that
/// participant in the room. Without one it goes to every other connection in
/// the room. The data blob is passed through untouched.
#[instrument(skip(state, message), fields(kind = ?message.kind, room_id = %message.payload.room))]
pub fn route(
    state: &SignalingState,
    from: ConnectionId,
    message: &SignalMessage,
) -> Result<RouteOutcome, AppError> {
    if !message.kind.is_signal() {
        return Err(AppError::InvalidRequest(format!(
            "{:?} is not a signaling message",
            message.kind
        )));
    }
    let payload = &message.payload;
    if payload.room.is_empty() {
        return Err(AppError::InvalidRequest("room is required".to_string()));
    }
    if payload.sender.is_empty() {
        return Err(AppError::InvalidRequest("sender is required".to_string()));
    }

    let frame = WebSocketMessage::signal(message.kind, payload);

    let Some(receiver) = payload.receiver.as_deref() else {
        let targets: Vec<ConnectionId> = state
            .connections
            .connections_in_room(&payload.room)
            .into_iter()
            .filter(|id| *id != from)
            .collect();
        let delivered = state.connections.send_to_many(&targets, &frame);
        debug!(sender = %payload.sender, recipients = delivered, "Signal broadcast to room");
        return Ok(RouteOutcome::Delivered(delivered));
    };

    let targets = state
        .connections
        .connections_bound_to(&payload.room, receiver);
    if targets.is_empty() {
        debug!(
            sender = %payload.sender,
            receiver = %receiver,
            "Receiver not in room, signal dropped"
        );
        return Ok(RouteOutcome::Dropped);
    }

    let delivered = state.connections.send_to_many(&targets, &frame);
    debug!(
        sender = %payload.sender,
        receiver = %receiver,
        recipients = delivered,
        "Signal relayed"
    );
    Ok(RouteOutcome::Delivered(delivered))
}
