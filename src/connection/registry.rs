use std::collections::{BTreeSet, HashMap, HashSet};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use super::models::{ConnectionId, Membership};
use crate::websockets::WebSocketMessage;

/// Per-connection record: where to send frames and which memberships it owns
#[derive(Debug)]
struct ConnectionEntry {
    sender: mpsc::Sender<String>,
    memberships: BTreeSet<Membership>,
}

/// Tracks live connections and the (room, participant) pairs bound to each
///
/// The registry knows nothing about room lifecycle. It only answers which
/// connections hold which memberships, and delivers frames to them.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, ConnectionEntry>,
    // room_id -> connections holding at least one membership in it
    by_room: HashMap<String, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, sender: mpsc::Sender<String>) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                sender,
                memberships: BTreeSet::new(),
            },
        );

        info!(
            connection_id = %connection_id,
            connection_count = self.connections.len(),
            "Connection registered"
        );
        connection_id
    }

    /// Removes a connection and hands back every membership it owned
    pub fn disconnect(&mut self, connection_id: ConnectionId) -> Vec<Membership> {
        let Some(entry) = self.connections.remove(&connection_id) else {
            debug!(connection_id = %connection_id, "Disconnect for unknown connection");
            return Vec::new();
        };

        for membership in &entry.memberships {
            self.remove_from_room_index(connection_id, &membership.room_id);
        }

        info!(
            connection_id = %connection_id,
            membership_count = entry.memberships.len(),
            connection_count = self.connections.len(),
            "Connection removed"
        );
        entry.memberships.into_iter().collect()
    }

    pub fn contains(&self, connection_id: ConnectionId) -> bool {
        self.connections.contains_key(&connection_id)
    }

    /// Records that a connection owns a membership; false if unknown connection
    pub fn bind(&mut self, connection_id: ConnectionId, membership: Membership) -> bool {
        let Some(entry) = self.connections.get_mut(&connection_id) else {
            return false;
        };

        self.by_room
            .entry(membership.room_id.clone())
            .or_default()
            .insert(connection_id);
        entry.memberships.insert(membership);
        true
    }

    /// Drops a membership from a connection; false if it did not own it
    pub fn unbind(&mut self, connection_id: ConnectionId, membership: &Membership) -> bool {
        let Some(entry) = self.connections.get_mut(&connection_id) else {
            return false;
        };
        if !entry.memberships.remove(membership) {
            return false;
        }

        let still_in_room = entry
            .memberships
            .iter()
            .any(|m| m.room_id == membership.room_id);
        if !still_in_room {
            self.remove_from_room_index(connection_id, &membership.room_id);
        }
        true
    }

    pub fn owns(&self, connection_id: ConnectionId, membership: &Membership) -> bool {
        self.connections
            .get(&connection_id)
            .is_some_and(|entry| entry.memberships.contains(membership))
    }

    /// Whether any connection other than `connection_id` owns the membership
    pub fn is_bound_elsewhere(&self, connection_id: ConnectionId, membership: &Membership) -> bool {
        self.connections_bound_to(&membership.room_id, &membership.participant)
            .into_iter()
            .any(|id| id != connection_id)
    }

    /// Every connection holding at least one membership in the room
    pub fn connections_in_room(&self, room_id: &str) -> Vec<ConnectionId> {
        self.by_room
            .get(room_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Connections bound to one participant id within one room
    pub fn connections_bound_to(&self, room_id: &str, participant: &str) -> Vec<ConnectionId> {
        let membership = Membership::new(room_id, participant);
        self.connections_in_room(room_id)
            .into_iter()
            .filter(|id| self.owns(*id, &membership))
            .collect()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Enqueues a frame for one connection without waiting on the client
    ///
    /// A connection whose outbound queue is full is not reading its socket;
    /// the frame is dropped for that connection only.
    pub fn send(&self, connection_id: ConnectionId, message: &WebSocketMessage) -> bool {
        let Some(entry) = self.connections.get(&connection_id) else {
            debug!(connection_id = %connection_id, "Send to unknown connection skipped");
            return false;
        };

        let frame = match serde_json::to_string(message) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(
                    connection_id = %connection_id,
                    error = %e,
                    "Failed to serialize outbound message"
                );
                return false;
            }
        };

        match entry.sender.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    connection_id = %connection_id,
                    message_type = ?message.message_type,
                    "Outbound queue full, frame dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(connection_id = %connection_id, "Outbound channel closed, frame dropped");
                false
            }
        }
    }

    /// Sends the same frame to several connections, returning how many accepted it
    pub fn send_to_many(&self, connection_ids: &[ConnectionId], message: &WebSocketMessage) -> usize {
        connection_ids
            .iter()
            .filter(|id| self.send(**id, message))
            .count()
    }

    fn remove_from_room_index(&mut self, connection_id: ConnectionId, room_id: &str) {
        if let Some(ids) = self.by_room.get_mut(room_id) {
            ids.remove(&connection_id);
            if ids.is_empty() {
                self.by_room.remove(room_id);
            }
        }
    }
}
