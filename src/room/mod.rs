// Public API - what other modules can use
pub use models::{Room, RoomState};
pub use registry::{JoinRoomResult, LeaveRoomResult, RoomRegistry};

// Internal modules
pub mod models;
pub mod registry;
