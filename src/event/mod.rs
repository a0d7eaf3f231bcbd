// Event-driven coordination
//
// Every inbound connect, join, leave, message and disconnect becomes a
// `SignalingEvent` handled by the single `EventDispatcher` task.

// Public API - what other modules can use
pub use dispatcher::EventDispatcher;
pub use events::SignalingEvent;
pub use handle::SignalingHandle;

// Internal modules
mod dispatcher;
mod events;
mod handle;
