// Public API - what other modules can use
pub use models::{ConnectionId, Membership};
pub use registry::ConnectionRegistry;

// Internal modules
mod models;
mod registry;
