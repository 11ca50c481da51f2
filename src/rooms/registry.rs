//! Registry mapping room names to their logs.

use super::log::ChatRoomLog;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Concurrent map of room name to message log.
///
/// A room's log is created exactly once, on first access; concurrent
/// first accesses for the same name all observe the same instance.
/// Entries live for the registry's lifetime — there is no eviction.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, Arc<ChatRoomLog>>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// The log for `name`, created if absent.
    pub fn get_or_create(&self, name: &str) -> Arc<ChatRoomLog> {
        // Fast path: the room already exists.
        if let Some(log) = self.rooms.read().get(name) {
            return Arc::clone(log);
        }

        let mut rooms = self.rooms.write();
        // A racing caller may have created it between the locks.
        Arc::clone(rooms.entry(name.to_string()).or_insert_with(|| {
            debug!(room = name, "created room log");
            Arc::new(ChatRoomLog::new())
        }))
    }

    /// The log for `name`, without creating it.
    pub fn get(&self, name: &str) -> Option<Arc<ChatRoomLog>> {
        self.rooms.read().get(name).map(Arc::clone)
    }

    /// Number of rooms created so far.
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Names of all rooms, in no particular order.
    pub fn room_names(&self) -> Vec<String> {
        self.rooms.read().keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
