// Signaling core
//
// `SignalingState` owns the room and connection registries. The router,
// presence broadcaster and lifecycle handler operate on it and are only ever
// called from the event dispatcher task.

// Public API - what other modules can use
pub use lifecycle::{handle_disconnect, DisconnectReport};
pub use router::{route, RouteOutcome, SignalMessage};
pub use state::{SignalingState, SignalingStats};

// Internal modules
mod lifecycle;
pub mod presence;
mod router;
mod state;
