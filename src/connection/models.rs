use std::fmt;
use uuid::Uuid;

/// Opaque identity of one live WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A (room, participant) pair owned by a connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Membership {
    pub room_id: String,
    pub participant: String,
}

impl Membership {
    pub fn new(room_id: impl Into<String>, participant: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            participant: participant.into(),
        }
    }
}
