use tracing::debug;

use super::state::SignalingState;
use crate::room::RoomState;
use crate::websockets::WebSocketMessage;

/// Pushes the room's current participant list to every connection joined to it
///
/// Returns the number of connections the frame was queued for. An absent room
/// has nobody left to notify.
pub fn broadcast(state: &SignalingState, room_id: &str) -> usize {
    let participants = match state.rooms.state(room_id) {
        RoomState::Active(room) => room.participants().to_vec(),
        RoomState::Absent => {
            debug!(room_id = %room_id, "Presence skipped, room no longer exists");
            return 0;
        }
    };

    let targets = state.connections.connections_in_room(room_id);
    let message = WebSocketMessage::presence(room_id.to_string(), participants);
    let delivered = state.connections.send_to_many(&targets, &message);

    debug!(
        room_id = %room_id,
        recipients = delivered,
        "Presence broadcast"
    );
    delivered
}
