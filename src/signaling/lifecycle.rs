use tracing::{debug, info, instrument};

use super::{presence, state::SignalingState};
use crate::connection::{ConnectionId, Membership};
use crate::room::LeaveRoomResult;

/// What a disconnect cleaned up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectReport {
    /// Memberships the connection owned when it went away
    pub released: Vec<Membership>,
    /// Rooms that lost a participant and were re-broadcast
    pub rooms_notified: Vec<String>,
    /// Rooms deleted because the connection held their last participant
    pub rooms_deleted: Vec<String>,
}

/// Reconciles both registries after a connection closes
///
/// Every membership the connection owned is released: the exact participant
/// bound to it leaves the room unless another live connection still holds the
/// same pair. Rooms that changed and still exist get a presence broadcast.
/// Lookup misses are treated as already resolved.
#[instrument(skip(state))]
pub fn handle_disconnect(state: &mut SignalingState, connection_id: ConnectionId) -> DisconnectReport {
    let released = state.connections.disconnect(connection_id);
    let mut report = DisconnectReport::default();

    for membership in &released {
        if state
            .connections
            .is_bound_elsewhere(connection_id, membership)
        {
            debug!(
                room_id = %membership.room_id,
                participant = %membership.participant,
                "Participant still held by another connection"
            );
            continue;
        }

        match state
            .rooms
            .leave(&membership.room_id, &membership.participant)
        {
            LeaveRoomResult::Left(_) => {
                presence::broadcast(state, &membership.room_id);
                push_unique(&mut report.rooms_notified, &membership.room_id);
            }
            LeaveRoomResult::RoomDeleted => {
                report.rooms_notified.retain(|r| r != &membership.room_id);
                push_unique(&mut report.rooms_deleted, &membership.room_id);
            }
            miss => {
                debug!(
                    room_id = %membership.room_id,
                    participant = %membership.participant,
                    result = ?miss,
                    "Cleanup found nothing to remove"
                );
            }
        }
    }

    info!(
        connection_id = %connection_id,
        released = released.len(),
        rooms_notified = report.rooms_notified.len(),
        rooms_deleted = report.rooms_deleted.len(),
        "Disconnect cleanup complete"
    );
    report.released = released;
    report
}

fn push_unique(rooms: &mut Vec<String>, room_id: &str) {
    if !rooms.iter().any(|r| r == room_id) {
        rooms.push(room_id.to_string());
    }
}
