use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use super::presence;
use crate::connection::{ConnectionId, ConnectionRegistry, Membership};
use crate::room::{LeaveRoomResult, RoomRegistry};
use crate::shared::AppError;
use crate::websockets::{JoinPayload, LeavePayload, WebSocketMessage};

/// Snapshot of registry sizes, used by the health endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalingStats {
    pub rooms: usize,
    pub connections: usize,
}

/// All shared signaling state: the room registry and the connection registry
///
/// Exactly one task owns this value; see `EventDispatcher`. Every operation
/// runs to completion against both registries before the next one starts.
#[derive(Debug, Default)]
pub struct SignalingState {
    pub(crate) rooms: RoomRegistry,
    pub(crate) connections: ConnectionRegistry,
    echo_presence_on_duplicate_join: bool,
}

impl SignalingState {
    pub fn new(echo_presence_on_duplicate_join: bool) -> Self {
        Self {
            rooms: RoomRegistry::new(),
            connections: ConnectionRegistry::new(),
            echo_presence_on_duplicate_join,
        }
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn connections(&self) -> &ConnectionRegistry {
        &self.connections
    }

    pub fn stats(&self) -> SignalingStats {
        SignalingStats {
            rooms: self.rooms.room_count(),
            connections: self.connections.connection_count(),
        }
    }

    pub fn connect(&mut self, sender: mpsc::Sender<String>) -> ConnectionId {
        self.connections.connect(sender)
    }

    /// Joins a participant to a room on behalf of a connection
    ///
    /// The caller gets a `JOINED` frame with the full list before the room's
    /// `PRESENCE` push, and the same list as the return value.
    #[instrument(skip(self, request), fields(room_id = %request.room, participant = %request.participant))]
    pub fn join(
        &mut self,
        connection_id: ConnectionId,
        request: JoinPayload,
        request_id: Option<String>,
    ) -> Result<Vec<String>, AppError> {
        if !self.connections.contains(connection_id) {
            return Err(AppError::InvalidRequest(
                "connection is not registered".to_string(),
            ));
        }

        let result = self.rooms.join(&request.room, &request.participant)?;
        self.connections.bind(
            connection_id,
            Membership::new(request.room.clone(), request.participant.clone()),
        );

        let participants = result.participants().to_vec();
        self.connections.send(
            connection_id,
            &WebSocketMessage::joined(request.room.clone(), participants.clone(), request_id),
        );

        if result.changed_membership() || self.echo_presence_on_duplicate_join {
            presence::broadcast(self, &request.room);
        } else {
            debug!(connection_id = %connection_id, "Duplicate join, presence unchanged");
        }

        Ok(participants)
    }

    /// Releases a membership owned by this connection. Never fails; a pair the
    /// connection does not own is acknowledged without any state change.
    #[instrument(skip(self, request), fields(room_id = %request.room, participant = %request.participant))]
    pub fn leave(
        &mut self,
        connection_id: ConnectionId,
        request: LeavePayload,
        request_id: Option<String>,
    ) {
        let membership = Membership::new(request.room.clone(), request.participant.clone());
        let result = self.release(connection_id, &membership);

        self.connections.send(
            connection_id,
            &WebSocketMessage::left(request.room.clone(), request.participant, request_id),
        );

        match result {
            Some(LeaveRoomResult::Left(_)) => {
                presence::broadcast(self, &request.room);
            }
            Some(LeaveRoomResult::RoomDeleted) => {
                info!(room_id = %request.room, "Room closed after leave");
            }
            Some(other) => {
                debug!(room_id = %request.room, result = ?other, "Leave already satisfied");
            }
            None => {}
        }
    }

    /// Drops the binding and, if no other connection still holds the same
    /// pair, removes the participant from the room
    fn release(
        &mut self,
        connection_id: ConnectionId,
        membership: &Membership,
    ) -> Option<LeaveRoomResult> {
        if !self.connections.unbind(connection_id, membership) {
            debug!(
                connection_id = %connection_id,
                room_id = %membership.room_id,
                participant = %membership.participant,
                "Leave for membership not owned by connection"
            );
            return None;
        }

        if self.connections.is_bound_elsewhere(connection_id, membership) {
            debug!(
                connection_id = %connection_id,
                room_id = %membership.room_id,
                participant = %membership.participant,
                "Participant still held by another connection"
            );
            return None;
        }

        Some(
            self.rooms
                .leave(&membership.room_id, &membership.participant),
        )
    }

    /// Sends an `ERROR` frame to one connection
    pub fn reject(&self, connection_id: ConnectionId, error: &AppError, request_id: Option<String>) {
        self.connections.send(
            connection_id,
            &WebSocketMessage::error(error.to_string(), request_id),
        );
    }
}
