use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::connection::ConnectionId;
use crate::event::SignalingHandle;
use crate::shared::AppState;
use crate::signaling::SignalMessage;
use crate::websockets::messages::{
    JoinPayload, LeavePayload, MessageType, SignalPayload, WebSocketMessage,
};

use super::socket::{FrameHandler, SocketSession};

/// Message handler for receiving WebSocket messages from the client
///
/// Parses frames and turns them into dispatcher events. Malformed frames are
/// answered here with an `ERROR`; everything else is answered by the
/// dispatcher so acks stay ordered with presence pushes.
pub struct SignalingMessageHandler {
    signaling: SignalingHandle,
    outbound: mpsc::Sender<String>,
}

impl SignalingMessageHandler {
    pub fn new(signaling: SignalingHandle, outbound: mpsc::Sender<String>) -> Self {
        Self {
            signaling,
            outbound,
        }
    }

    fn reply_error(&self, connection_id: ConnectionId, message: String, request_id: Option<String>) {
        match serde_json::to_string(&WebSocketMessage::error(message, request_id)) {
            Ok(frame) => {
                if self.outbound.try_send(frame).is_err() {
                    debug!(connection_id = %connection_id, "Outbound queue unavailable, error dropped");
                }
            }
            Err(e) => warn!(connection_id = %connection_id, error = %e, "Failed to serialize error"),
        }
    }

    fn parse_payload<T: DeserializeOwned>(
        &self,
        connection_id: ConnectionId,
        ws_message: &WebSocketMessage,
    ) -> Option<T> {
        match serde_json::from_value::<T>(ws_message.payload.clone()) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    message_type = ?ws_message.message_type,
                    error = %e,
                    "Invalid payload"
                );
                self.reply_error(
                    connection_id,
                    format!("Invalid payload: {}", e),
                    ws_message.request_id(),
                );
                None
            }
        }
    }
}

#[async_trait]
impl FrameHandler for SignalingMessageHandler {
    async fn handle_frame(&self, connection_id: ConnectionId, message: String) {
        debug!(
            connection_id = %connection_id,
            message = %message,
            "Received message"
        );

        let ws_message = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => ws_message,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to parse WebSocket message"
                );
                self.reply_error(connection_id, format!("Malformed message: {}", e), None);
                return;
            }
        };
        let request_id = ws_message.request_id();

        // Errors below are already reported to the client by the dispatcher
        let result = match ws_message.message_type {
            MessageType::Join => {
                let Some(request) = self.parse_payload::<JoinPayload>(connection_id, &ws_message)
                else {
                    return;
                };
                self.signaling
                    .join(connection_id, request, request_id)
                    .await
                    .map(|_| ())
            }
            MessageType::Leave => {
                let Some(request) = self.parse_payload::<LeavePayload>(connection_id, &ws_message)
                else {
                    return;
                };
                self.signaling
                    .leave(connection_id, request, request_id)
                    .await
            }
            kind if kind.is_signal() => {
                let Some(payload) = self.parse_payload::<SignalPayload>(connection_id, &ws_message)
                else {
                    return;
                };
                self.signaling
                    .route(connection_id, SignalMessage::new(kind, payload), request_id)
                    .await
                    .map(|_| ())
            }
            other => {
                warn!(
                    connection_id = %connection_id,
                    message_type = ?other,
                    "Client sent a server-only message type"
                );
                self.reply_error(
                    connection_id,
                    format!("{:?} cannot be sent by clients", other),
                    request_id,
                );
                return;
            }
        };

        if let Err(e) = result {
            debug!(connection_id = %connection_id, error = %e, "Message not applied");
        }
    }
}

/// WebSocket endpoint
/// GET /ws
///
/// Participants are not authenticated here; identifiers in JOIN frames are
/// trusted as supplied.
///
/// A LEAVE only releases a (room, participant) pair this connection joined
/// itself. A pair held by another connection, or never joined, is acked
/// without changing the room; the owning connection releases it on its own
/// leave or disconnect. The LEFT ack echoes `{room, participant}` from the
/// request so clients can match it without a `request_id`.
#[instrument(name = "websocket_handler", skip(ws, app_state))]
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    info!("WebSocket connection requested");

    ws.max_message_size(app_state.config.max_message_bytes)
        .on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) =
        mpsc::channel::<String>(app_state.config.outbound_buffer);

    let connection_id = match app_state.signaling.connect(outbound_sender.clone()).await {
        Ok(connection_id) => connection_id,
        Err(e) => {
            warn!(error = %e, "Could not register connection");
            return;
        }
    };

    info!(connection_id = %connection_id, "WebSocket connection established");

    let message_handler = Arc::new(SignalingMessageHandler::new(
        app_state.signaling.clone(),
        outbound_sender,
    ));

    let session = SocketSession::new(
        connection_id,
        Box::new(socket),
        outbound_receiver,
        message_handler,
    );

    match session.run().await {
        Ok(summary) => {
            info!(
                connection_id = %connection_id,
                ended_by = ?summary.ended_by,
                frames_in = summary.frames_in,
                frames_out = summary.frames_out,
                "WebSocket session ended"
            );
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "WebSocket session failed");
        }
    }

    // Cleanup: release every membership this connection owned
    match app_state.signaling.disconnect(connection_id).await {
        Ok(report) => {
            info!(
                connection_id = %connection_id,
                released = report.released.len(),
                rooms_deleted = report.rooms_deleted.len(),
                "Connection cleanup complete"
            );
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "Connection cleanup failed");
        }
    }
}
