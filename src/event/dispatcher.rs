use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::events::SignalingEvent;
use crate::config::AppConfig;
use crate::signaling::{self, SignalingState};

/// The single owner of `SignalingState`
///
/// Events arrive over a bounded channel and are applied strictly in order, so
/// join, leave, routing and disconnect cleanup never interleave. Outbound
/// frames go to per-connection bounded queues via `try_send` and never wait on
/// a client.
pub struct EventDispatcher {
    state: SignalingState,
    receiver: mpsc::Receiver<SignalingEvent>,
}

impl EventDispatcher {
    pub fn new(state: SignalingState, receiver: mpsc::Receiver<SignalingEvent>) -> Self {
        Self { state, receiver }
    }

    /// Spawns the dispatcher task and returns a handle for talking to it
    pub fn spawn(config: &AppConfig) -> (super::SignalingHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(config.event_buffer);
        let state = SignalingState::new(config.echo_presence_on_duplicate_join);
        let dispatcher = Self::new(state, receiver);

        info!(
            event_buffer = config.event_buffer,
            echo_presence_on_duplicate_join = config.echo_presence_on_duplicate_join,
            "Starting signaling event dispatcher"
        );

        let task = tokio::spawn(dispatcher.run());
        (super::SignalingHandle::new(sender), task)
    }

    /// Processes events until every handle has been dropped
    pub async fn run(mut self) {
        while let Some(event) = self.receiver.recv().await {
            debug!(event_type = event.event_type(), "Dispatching event");
            self.dispatch(event);
        }

        info!("Event dispatcher stopped, all handles dropped");
    }

    fn dispatch(&mut self, event: SignalingEvent) {
        match event {
            SignalingEvent::Connect { sender, reply } => {
                let connection_id = self.state.connect(sender);
                if reply.send(connection_id).is_err() {
                    // Caller gave up before learning its id; nobody can use it
                    warn!(connection_id = %connection_id, "Connect reply dropped, removing connection");
                    signaling::handle_disconnect(&mut self.state, connection_id);
                }
            }
            SignalingEvent::Join {
                connection_id,
                request,
                request_id,
                reply,
            } => {
                let result = self.state.join(connection_id, request, request_id.clone());
                if let Err(e) = &result {
                    warn!(connection_id = %connection_id, error = %e, "Join rejected");
                    self.state.reject(connection_id, e, request_id);
                }
                let _ = reply.send(result);
            }
            SignalingEvent::Leave {
                connection_id,
                request,
                request_id,
                reply,
            } => {
                self.state.leave(connection_id, request, request_id);
                let _ = reply.send(());
            }
            SignalingEvent::Message {
                connection_id,
                message,
                request_id,
                reply,
            } => {
                let result = signaling::route(&self.state, connection_id, &message);
                if let Err(e) = &result {
                    warn!(connection_id = %connection_id, error = %e, "Signal rejected");
                    self.state.reject(connection_id, e, request_id);
                }
                let _ = reply.send(result);
            }
            SignalingEvent::Disconnect {
                connection_id,
                reply,
            } => {
                let report = signaling::handle_disconnect(&mut self.state, connection_id);
                let _ = reply.send(report);
            }
            SignalingEvent::ListParticipants { room_id, reply } => {
                let _ = reply.send(self.state.rooms().list_participants(&room_id));
            }
            SignalingEvent::Stats { reply } => {
                let _ = reply.send(self.state.stats());
            }
        }
    }
}
