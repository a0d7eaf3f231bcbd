//! Test assertion helpers - fluent API for verifying received frames
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use signalhub::{MessageType, WebSocketMessage};

use super::client::TestClient;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct FrameAssertion {
    owner: String,
    frames: Vec<WebSocketMessage>,
}

impl FrameAssertion {
    /// Takes every frame currently queued for the client
    pub fn for_client(client: &mut TestClient) -> Self {
        Self {
            owner: client.name.clone(),
            frames: client.frames(),
        }
    }

    pub fn received_nothing(self) {
        assert!(
            self.frames.is_empty(),
            "{} should have received nothing, got {:?}",
            self.owner,
            self.frames
        );
    }

    pub fn types(&self) -> Vec<MessageType> {
        self.frames.iter().map(|f| f.message_type).collect()
    }

    pub fn received_types(self, expected: &[MessageType]) -> Self {
        assert_eq!(
            self.types(),
            expected,
            "{} received unexpected frame types",
            self.owner
        );
        self
    }

    /// Participants carried by the n-th frame, sorted for order-free comparison
    pub fn participants_at(&self, index: usize) -> Vec<String> {
        let frame = self
            .frames
            .get(index)
            .unwrap_or_else(|| panic!("{} has no frame at {}", self.owner, index));
        let mut participants: Vec<String> =
            serde_json::from_value(frame.payload["participants"].clone()).unwrap();
        participants.sort();
        participants
    }

    pub fn with_participants_at(self, index: usize, expected: &[&str]) -> Self {
        let mut expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(
            self.participants_at(index),
            expected,
            "{} frame {} has wrong participants",
            self.owner,
            index
        );
        self
    }

    pub fn payload_at(&self, index: usize) -> &Value {
        &self.frames[index].payload
    }

    pub fn frame_at(&self, index: usize) -> &WebSocketMessage {
        &self.frames[index]
    }
}
