use std::collections::HashMap;
use tracing::{debug, info, instrument};

use super::models::{Room, RoomState};
use crate::shared::AppError;

/// Result of joining a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinRoomResult {
    /// Room did not exist and was created with this participant
    Created(Vec<String>),
    /// Participant was added to an existing room
    Joined(Vec<String>),
    /// Participant was already a member, nothing changed
    AlreadyMember(Vec<String>),
}

impl JoinRoomResult {
    /// Full participant list after the join, including the joiner
    pub fn participants(&self) -> &[String] {
        match self {
            JoinRoomResult::Created(p)
            | JoinRoomResult::Joined(p)
            | JoinRoomResult::AlreadyMember(p) => p,
        }
    }

    pub fn changed_membership(&self) -> bool {
        !matches!(self, JoinRoomResult::AlreadyMember(_))
    }
}

/// Result of leaving a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveRoomResult {
    /// Participant removed, room still active with these participants
    Left(Vec<String>),
    /// Participant removed and the room became empty, so it was deleted
    RoomDeleted,
    /// Participant was not in the room
    ParticipantNotInRoom,
    /// Room does not exist
    RoomNotFound,
}

/// Maps room ids to their participants
///
/// Only active rooms are stored: a room is inserted by the join that creates
/// it and removed by the leave that empties it.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(skip(self))]
    pub fn join(&mut self, room_id: &str, participant: &str) -> Result<JoinRoomResult, AppError> {
        if room_id.is_empty() {
            return Err(AppError::InvalidRequest("room is required".to_string()));
        }
        if participant.is_empty() {
            return Err(AppError::InvalidRequest(
                "participant is required".to_string(),
            ));
        }

        let Some(room) = self.rooms.get_mut(room_id) else {
            let room = Room::with_first_participant(room_id.to_string(), participant.to_string());
            let participants = room.participants().to_vec();
            self.rooms.insert(room_id.to_string(), room);

            info!(room_id = %room_id, participant = %participant, "Room created");
            return Ok(JoinRoomResult::Created(participants));
        };

        if !room.add_participant(participant.to_string()) {
            debug!(room_id = %room_id, participant = %participant, "Participant already in room");
            return Ok(JoinRoomResult::AlreadyMember(room.participants().to_vec()));
        }

        info!(
            room_id = %room_id,
            participant = %participant,
            participant_count = room.participant_count(),
            "Participant joined room"
        );
        Ok(JoinRoomResult::Joined(room.participants().to_vec()))
    }

    #[instrument(skip(self))]
    pub fn leave(&mut self, room_id: &str, participant: &str) -> LeaveRoomResult {
        let Some(room) = self.rooms.get_mut(room_id) else {
            debug!(room_id = %room_id, "Room not found");
            return LeaveRoomResult::RoomNotFound;
        };

        if !room.remove_participant(participant) {
            debug!(room_id = %room_id, participant = %participant, "Participant not in room");
            return LeaveRoomResult::ParticipantNotInRoom;
        }

        if room.is_empty() {
            self.rooms.remove(room_id);
            info!(room_id = %room_id, participant = %participant, "Room is now empty, deleted");
            return LeaveRoomResult::RoomDeleted;
        }

        info!(
            room_id = %room_id,
            participant = %participant,
            participant_count = room.participant_count(),
            "Participant left room"
        );
        LeaveRoomResult::Left(room.participants().to_vec())
    }

    pub fn state(&self, room_id: &str) -> RoomState<'_> {
        match self.rooms.get(room_id) {
            Some(room) => RoomState::Active(room),
            None => RoomState::Absent,
        }
    }

    pub fn list_participants(&self, room_id: &str) -> Vec<String> {
        self.state(room_id).participants()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
