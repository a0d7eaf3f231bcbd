/// An active room and its participants
///
/// Participants are kept in join order with no duplicates. A `Room` is only
/// ever stored while it has at least one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    participants: Vec<String>,
}

impl Room {
    /// Creates a room holding its first participant
    pub fn with_first_participant(id: String, participant: String) -> Self {
        Self {
            id,
            participants: vec![participant],
        }
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn has_participant(&self, participant: &str) -> bool {
        self.participants.iter().any(|p| p == participant)
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Adds a participant, returning false if it was already present
    pub fn add_participant(&mut self, participant: String) -> bool {
        if self.has_participant(&participant) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Removes a participant, returning false if it was not present
    pub fn remove_participant(&mut self, participant: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p != participant);
        self.participants.len() != before
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }
}

/// Lifecycle state of a room id: `Absent -> Active(members) -> Absent`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState<'a> {
    Absent,
    Active(&'a Room),
}

impl RoomState<'_> {
    pub fn is_active(&self) -> bool {
        matches!(self, RoomState::Active(_))
    }

    pub fn participants(&self) -> Vec<String> {
        match self {
            RoomState::Absent => Vec::new(),
            RoomState::Active(room) => room.participants().to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_participant_is_idempotent() {
        let mut room = Room::with_first_participant("r1".to_string(), "u1".to_string());

        assert!(room.add_participant("u2".to_string()));
        assert!(!room.add_participant("u2".to_string()));
        assert_eq!(room.participants(), ["u1", "u2"]);
    }

    #[test]
    fn test_remove_participant_reports_change() {
        let mut room = Room::with_first_participant("r1".to_string(), "u1".to_string());

        assert!(!room.remove_participant("ghost"));
        assert!(room.remove_participant("u1"));
        assert!(room.is_empty());
    }

    #[test]
    fn test_room_state_participants() {
        let room = Room::with_first_participant("r1".to_string(), "u1".to_string());

        assert!(RoomState::Absent.participants().is_empty());
        assert!(!RoomState::Absent.is_active());
        assert_eq!(RoomState::Active(&room).participants(), vec!["u1"]);
    }
}
