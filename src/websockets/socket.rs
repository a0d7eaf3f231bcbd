use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::StreamExt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

use crate::connection::ConnectionId;

/// Text-frame transport for one signaling client
#[async_trait]
pub trait SignalingSocket: Send {
    async fn send_text(&mut self, frame: String) -> Result<(), SocketError>;

    /// Next text frame from the client, `None` once it has gone away
    async fn next_text(&mut self) -> Result<Option<String>, SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Consumes the inbound text frames of a connection
#[async_trait]
pub trait FrameHandler: Send + Sync {
    async fn handle_frame(&self, connection_id: ConnectionId, frame: String);
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("failed to send frame: {0}")]
    Send(String),
    #[error("failed to read frame: {0}")]
    Receive(String),
}

#[async_trait]
impl SignalingSocket for WebSocket {
    async fn send_text(&mut self, frame: String) -> Result<(), SocketError> {
        self.send(Message::Text(frame))
            .await
            .map_err(|e| SocketError::Send(e.to_string()))
    }

    async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
        while let Some(message) = self.next().await {
            match message.map_err(|e| SocketError::Receive(e.to_string()))? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // axum answers pings itself; binary frames are not part of the protocol
                Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.send(Message::Close(None))
            .await
            .map_err(|e| SocketError::Send(e.to_string()))
    }
}

/// Why a socket session stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the socket or the stream ended
    ClientClosed,
    /// Every sender for the outbound queue was dropped
    OutboundClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub ended_by: SessionEnd,
    pub frames_in: usize,
    pub frames_out: usize,
}

/// Pumps one client socket
///
/// Inbound text frames go to the frame handler. Frames the dispatcher queued
/// for this connection are written to the client, ahead of reading the next
/// inbound frame.
pub struct SocketSession {
    connection_id: ConnectionId,
    socket: Box<dyn SignalingSocket>,
    outbound: mpsc::Receiver<String>,
    handler: Arc<dyn FrameHandler>,
}

impl SocketSession {
    pub fn new(
        connection_id: ConnectionId,
        socket: Box<dyn SignalingSocket>,
        outbound: mpsc::Receiver<String>,
        handler: Arc<dyn FrameHandler>,
    ) -> Self {
        Self {
            connection_id,
            socket,
            outbound,
            handler,
        }
    }

    pub async fn run(mut self) -> Result<SessionSummary, SocketError> {
        let mut frames_in = 0;
        let mut frames_out = 0;

        let ended_by = loop {
            tokio::select! {
                biased;

                queued = self.outbound.recv() => match queued {
                    Some(frame) => {
                        self.socket.send_text(frame).await?;
                        frames_out += 1;
                    }
                    None => break SessionEnd::OutboundClosed,
                },

                inbound = self.socket.next_text() => match inbound? {
                    Some(frame) => {
                        frames_in += 1;
                        self.handler.handle_frame(self.connection_id, frame).await;
                    }
                    None => break SessionEnd::ClientClosed,
                },
            }
        };

        if let Err(e) = self.socket.close().await {
            debug!(connection_id = %self.connection_id, error = %e, "Close frame not sent");
        }

        Ok(SessionSummary {
            ended_by,
            frames_in,
            frames_out,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct Wire {
        sent: Vec<String>,
        closed: bool,
    }

    /// Replays scripted inbound results, then waits forever or reports closed
    struct ScriptedSocket {
        inbound: VecDeque<Result<String, SocketError>>,
        hang_when_empty: bool,
        wire: Arc<Mutex<Wire>>,
    }

    impl ScriptedSocket {
        fn new(inbound: Vec<Result<String, SocketError>>, wire: &Arc<Mutex<Wire>>) -> Self {
            Self {
                inbound: inbound.into(),
                hang_when_empty: false,
                wire: wire.clone(),
            }
        }

        fn hanging(wire: &Arc<Mutex<Wire>>) -> Self {
            Self {
                inbound: VecDeque::new(),
                hang_when_empty: true,
                wire: wire.clone(),
            }
        }
    }

    #[async_trait]
    impl SignalingSocket for ScriptedSocket {
        async fn send_text(&mut self, frame: String) -> Result<(), SocketError> {
            self.wire.lock().await.sent.push(frame);
            Ok(())
        }

        async fn next_text(&mut self) -> Result<Option<String>, SocketError> {
            match self.inbound.pop_front() {
                Some(result) => result.map(Some),
                None if self.hang_when_empty => std::future::pending().await,
                None => Ok(None),
            }
        }

        async fn close(&mut self) -> Result<(), SocketError> {
            self.wire.lock().await.closed = true;
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        frames: Mutex<Vec<(ConnectionId, String)>>,
    }

    #[async_trait]
    impl FrameHandler for RecordingHandler {
        async fn handle_frame(&self, connection_id: ConnectionId, frame: String) {
            self.frames.lock().await.push((connection_id, frame));
        }
    }

    #[tokio::test]
    async fn test_inbound_frames_reach_handler_until_client_closes() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let handler = Arc::new(RecordingHandler::default());
        let (_tx, rx) = mpsc::channel(8);
        let id = ConnectionId::new();
        let socket = ScriptedSocket::new(vec![Ok("one".to_string()), Ok("two".to_string())], &wire);

        let summary = SocketSession::new(id, Box::new(socket), rx, handler.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(summary.ended_by, SessionEnd::ClientClosed);
        assert_eq!(summary.frames_in, 2);
        assert_eq!(
            *handler.frames.lock().await,
            vec![(id, "one".to_string()), (id, "two".to_string())]
        );
        assert!(wire.lock().await.closed);
    }

    #[tokio::test]
    async fn test_queued_frames_flush_before_outbound_close_ends_session() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let (tx, rx) = mpsc::channel(8);
        tx.send("joined".to_string()).await.unwrap();
        tx.send("presence".to_string()).await.unwrap();
        drop(tx);

        let summary = SocketSession::new(
            ConnectionId::new(),
            Box::new(ScriptedSocket::hanging(&wire)),
            rx,
            Arc::new(RecordingHandler::default()),
        )
        .run()
        .await
        .unwrap();

        assert_eq!(summary.ended_by, SessionEnd::OutboundClosed);
        assert_eq!(summary.frames_out, 2);
        let wire = wire.lock().await;
        assert_eq!(wire.sent, vec!["joined", "presence"]);
        assert!(wire.closed);
    }

    #[tokio::test]
    async fn test_read_error_ends_session_with_error() {
        let wire = Arc::new(Mutex::new(Wire::default()));
        let handler = Arc::new(RecordingHandler::default());
        let (_tx, rx) = mpsc::channel(8);
        let socket = ScriptedSocket::new(
            vec![
                Ok("first".to_string()),
                Err(SocketError::Receive("reset".to_string())),
            ],
            &wire,
        );

        let result = SocketSession::new(ConnectionId::new(), Box::new(socket), rx, handler.clone())
            .run()
            .await;

        assert!(matches!(result, Err(SocketError::Receive(_))));
        assert_eq!(handler.frames.lock().await.len(), 1);
    }
}
