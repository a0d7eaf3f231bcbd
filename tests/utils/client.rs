//! Test client - drives one connection through the same message handler the
//! WebSocket transport uses, and collects the frames pushed to it
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::{json, Value};
use tokio::sync::mpsc;

use signalhub::{
    websockets::FrameHandler, ConnectionId, DisconnectReport, SignalingHandle,
    SignalingMessageHandler, WebSocketMessage,
};

pub struct TestClient {
    pub name: String,
    pub id: ConnectionId,
    handler: SignalingMessageHandler,
    signaling: SignalingHandle,
    outbound: mpsc::Receiver<String>,
}

impl TestClient {
    pub fn new(
        name: &str,
        id: ConnectionId,
        handler: SignalingMessageHandler,
        signaling: SignalingHandle,
        outbound: mpsc::Receiver<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            id,
            handler,
            signaling,
            outbound,
        }
    }

    /// Sends a raw text frame as if it came off the socket
    pub async fn send_raw(&self, frame: &str) {
        self.handler.handle_frame(self.id, frame.to_string()).await;
    }

    pub async fn send(&self, message_type: &str, payload: Value, request_id: Option<&str>) {
        let mut frame = json!({ "type": message_type, "payload": payload });
        if let Some(request_id) = request_id {
            frame["meta"] = json!({ "request_id": request_id });
        }
        self.send_raw(&frame.to_string()).await;
    }

    pub async fn join(&self, room: &str, participant: &str) {
        self.send(
            "JOIN",
            json!({ "room": room, "participant": participant }),
            None,
        )
        .await;
    }

    pub async fn leave(&self, room: &str, participant: &str) {
        self.send(
            "LEAVE",
            json!({ "room": room, "participant": participant }),
            None,
        )
        .await;
    }

    pub async fn signal(
        &self,
        kind: &str,
        room: &str,
        sender: &str,
        receiver: Option<&str>,
        data: Value,
    ) {
        let mut payload = json!({ "room": room, "sender": sender, "data": data });
        if let Some(receiver) = receiver {
            payload["receiver"] = json!(receiver);
        }
        self.send(kind, payload, None).await;
    }

    /// Simulates the transport closing
    pub async fn disconnect(self) -> DisconnectReport {
        self.signaling.disconnect(self.id).await.unwrap()
    }

    /// Drains every frame queued for this client so far
    ///
    /// The dispatcher queues all frames for an event before replying, so
    /// once a send above has returned its effects are already visible here.
    pub fn frames(&mut self) -> Vec<WebSocketMessage> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(serde_json::from_str(&frame).unwrap());
        }
        frames
    }

    pub fn clear(&mut self) {
        self.frames();
    }
}
