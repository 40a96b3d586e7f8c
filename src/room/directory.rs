use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::signaling::session::SessionHandle;

/// Result of adding a session to a room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The room did not exist; the joiner is its first member
    Created,
    /// The room already had members
    Joined,
}

/// Process-wide mapping from room id to member sessions.
///
/// The single mutex guards only the map itself: every operation locks,
/// mutates or snapshots, and unlocks without touching the network, so a
/// slow peer in one room never blocks joins or relays in another.
pub struct RoomDirectory {
    rooms: Mutex<HashMap<String, HashMap<String, SessionHandle>>>,
}

impl Default for RoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
        }
    }

    /// Adds `member` to the named room, creating the room if absent.
    /// Re-joining a room the session is already in has no duplicate effect.
    pub fn join(&self, room_id: &str, member: SessionHandle) -> JoinOutcome {
        let mut rooms = self.rooms.lock().unwrap();
        let room = rooms.entry(room_id.to_string()).or_default();
        room.insert(member.uuid().to_string(), member);

        if room.len() == 1 {
            info!(room_id = %room_id, "Room created");
            JoinOutcome::Created
        } else {
            debug!(room_id = %room_id, members = room.len(), "Joined existing room");
            JoinOutcome::Joined
        }
    }

    /// Removes a member; deletes the room entry the moment it empties, so
    /// no empty room ever survives a mutation. Removing an absent member
    /// (or from an absent room) is a no-op.
    pub fn leave(&self, room_id: &str, uuid: &str) {
        let mut rooms = self.rooms.lock().unwrap();
        let Some(room) = rooms.get_mut(room_id) else {
            return;
        };
        if room.remove(uuid).is_none() {
            return;
        }
        debug!(room_id = %room_id, uuid = %uuid, "Left room");
        if room.is_empty() {
            rooms.remove(room_id);
            info!(room_id = %room_id, "Room removed, no members left");
        }
    }

    /// Snapshot of the room's current members (empty if the room does not
    /// exist). Relays iterate the snapshot outside the lock.
    pub fn members(&self, room_id: &str) -> Vec<SessionHandle> {
        let rooms = self.rooms.lock().unwrap();
        rooms
            .get(room_id)
            .map(|room| room.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains_room(&self, room_id: &str) -> bool {
        self.rooms.lock().unwrap().contains_key(room_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(uuid: &str) -> SessionHandle {
        let (handle, _receiver) = SessionHandle::channel(uuid.to_string(), 8);
        handle
    }

    #[test]
    fn test_first_join_creates_then_subsequent_joins_join() {
        let directory = RoomDirectory::new();

        assert_eq!(directory.join("r1", member("a")), JoinOutcome::Created);
        assert_eq!(directory.join("r1", member("b")), JoinOutcome::Joined);
        assert_eq!(directory.join("r1", member("c")), JoinOutcome::Joined);
        assert_eq!(directory.members("r1").len(), 3);
    }

    #[test]
    fn test_rejoin_same_room_has_no_duplicate_effect() {
        let directory = RoomDirectory::new();

        directory.join("r1", member("a"));
        directory.join("r1", member("b"));
        assert_eq!(directory.join("r1", member("a")), JoinOutcome::Joined);
        assert_eq!(directory.members("r1").len(), 2);
    }

    #[test]
    fn test_room_removed_when_last_member_leaves() {
        let directory = RoomDirectory::new();

        directory.join("r1", member("a"));
        directory.join("r1", member("b"));
        assert!(directory.contains_room("r1"));

        directory.leave("r1", "a");
        assert!(directory.contains_room("r1"));
        assert_eq!(directory.members("r1").len(), 1);

        directory.leave("r1", "b");
        assert!(!directory.contains_room("r1"));
        assert_eq!(directory.room_count(), 0);
    }

    #[test]
    fn test_leave_is_idempotent_and_scoped() {
        let directory = RoomDirectory::new();

        directory.join("r1", member("a"));
        directory.join("r2", member("b"));

        // Never joined, already removed, unknown room: all no-ops
        directory.leave("r1", "ghost");
        directory.leave("r1", "a");
        directory.leave("r1", "a");
        directory.leave("nowhere", "a");

        assert!(!directory.contains_room("r1"));
        assert!(directory.contains_room("r2"));
        assert_eq!(directory.members("r2").len(), 1);
    }

    #[test]
    fn test_members_of_unknown_room_is_empty() {
        let directory = RoomDirectory::new();
        assert!(directory.members("nowhere").is_empty());
    }
}
