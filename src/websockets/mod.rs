// Public API
pub use handler::{websocket_handler, SignalingMessageHandler};
pub use messages::{
    JoinPayload, LeavePayload, MessageType, PresencePayload, SignalPayload, WebSocketMessage,
};
pub use socket::{
    FrameHandler, SessionEnd, SessionSummary, SignalingSocket, SocketError, SocketSession,
};

// Internal modules
mod handler;
mod messages;
mod socket;
