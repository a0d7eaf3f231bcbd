use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageType {
    // Client -> Server
    Join,
    Leave,

    // Relayed in both directions
    Offer,
    Answer,
    IceCandidate,
    Signal,

    // Server -> Client
    Joined,
    Left,
    Presence,
    Error,
}

impl MessageType {
    /// Whether frames of this type are relayed between peers untouched
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            MessageType::Offer | MessageType::Answer | MessageType::IceCandidate | MessageType::Signal
        )
    }
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
    /// Client-chosen id echoed back on the ack or error for that request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
///
/// Missing fields deserialize as empty strings so that validation, not
/// parsing, decides whether the request is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinPayload {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub participant: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeavePayload {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub participant: String,
}

/// Offer, answer, candidate or generic signal. `data` is never inspected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalPayload {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedPayload {
    pub room: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeftPayload {
    pub room: String,
    pub participant: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresencePayload {
    pub room: String,
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

fn to_payload<T: Serialize>(payload: T) -> serde_json::Value {
    serde_json::to_value(payload).unwrap_or_default()
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self::with_request_id(message_type, payload, None)
    }

    pub fn with_request_id(
        message_type: MessageType,
        payload: serde_json::Value,
        request_id: Option<String>,
    ) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
                request_id,
            }),
        }
    }

    pub fn request_id(&self) -> Option<String> {
        self.meta.as_ref().and_then(|meta| meta.request_id.clone())
    }

    /// Create a JOINED acknowledgement
    pub fn joined(room: String, participants: Vec<String>, request_id: Option<String>) -> Self {
        let payload = JoinedPayload { room, participants };
        Self::with_request_id(MessageType::Joined, to_payload(payload), request_id)
    }

    /// Create a LEFT acknowledgement
    pub fn left(room: String, participant: String, request_id: Option<String>) -> Self {
        let payload = LeftPayload { room, participant };
        Self::with_request_id(MessageType::Left, to_payload(payload), request_id)
    }

    /// Create a PRESENCE push
    pub fn presence(room: String, participants: Vec<String>) -> Self {
        let payload = PresencePayload { room, participants };
        Self::new(MessageType::Presence, to_payload(payload))
    }

    /// Create an ERROR message
    pub fn error(message: String, request_id: Option<String>) -> Self {
        let payload = ErrorPayload { message };
        Self::with_request_id(MessageType::Error, to_payload(payload), request_id)
    }

    /// Create a relayed signaling message of the given kind
    pub fn signal(kind: MessageType, payload: &SignalPayload) -> Self {
        Self::new(kind, to_payload(payload))
    }
}
