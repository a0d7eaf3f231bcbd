pub mod assertions;
pub mod client;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::FrameAssertion;
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
