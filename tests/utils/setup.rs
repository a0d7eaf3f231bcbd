//! Test setup - a live dispatcher plus helpers for creating clients
#![allow(dead_code)] // Test utilities may not all be used in every test

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use signalhub::{AppConfig, EventDispatcher, SignalingHandle, SignalingMessageHandler};

use super::client::TestClient;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub signaling: SignalingHandle,
    pub outbound_buffer: usize,
    pub _dispatcher_handle: JoinHandle<()>,
}

pub struct TestSetupBuilder {
    config: AppConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
        }
    }

    pub fn with_duplicate_join_echo(mut self) -> Self {
        self.config.echo_presence_on_duplicate_join = true;
        self
    }

    pub fn with_outbound_buffer(mut self, outbound_buffer: usize) -> Self {
        self.config.outbound_buffer = outbound_buffer;
        self
    }

    pub fn build(self) -> TestSetup {
        let (signaling, dispatcher_handle) = EventDispatcher::spawn(&self.config);
        TestSetup {
            signaling,
            outbound_buffer: self.config.outbound_buffer,
            _dispatcher_handle: dispatcher_handle,
        }
    }
}

impl TestSetup {
    /// Registers a new connection, as a completed WebSocket upgrade would
    pub async fn connect(&self, name: &str) -> TestClient {
        let (tx, rx) = mpsc::channel(self.outbound_buffer);
        let id = self.signaling.connect(tx.clone()).await.unwrap();
        let handler = SignalingMessageHandler::new(self.signaling.clone(), tx);
        TestClient::new(name, id, handler, self.signaling.clone(), rx)
    }

    pub async fn participants(&self, room: &str) -> Vec<String> {
        let mut participants = self.signaling.list_participants(room).await.unwrap();
        participants.sort();
        participants
    }

    pub async fn room_count(&self) -> usize {
        self.signaling.stats().await.unwrap().rooms
    }
}
