use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::HubSettings;
use crate::connection::Connection;
use crate::error::{HubError, Result};
use crate::room::Room;

/// Rooms by name.
///
/// Rooms are created and deleted explicitly; an empty room stays until it is
/// deleted.
#[derive(Debug, Default)]
pub struct RoomDirectory {
    rooms: RwLock<BTreeMap<String, Arc<Room>>>,
}

impl RoomDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create every default room of `settings`.
    pub fn from_settings(settings: &HubSettings) -> Result<Self> {
        let directory = Self::new();
        for spec in &settings.default_rooms {
            directory.insert(Room::from_spec(spec))?;
        }
        Ok(directory)
    }

    /// Create a visible, deny-list room named `name`.
    pub fn create(&self, name: &str) -> Result<Arc<Room>> {
        self.insert(Room::new(name))
    }

    pub fn insert(&self, room: Room) -> Result<Arc<Room>> {
        let mut rooms = self.write();
        if rooms.contains_key(room.name()) {
            return Err(HubError::RoomExists(room.name().to_string()));
        }
        let room = Arc::new(room);
        rooms.insert(room.name().to_string(), room.clone());
        tracing::debug!(room = room.name(), "room created");
        Ok(room)
    }

    /// Remove a room. Its members are dropped from it first.
    pub fn delete(&self, name: &str) -> Result<Arc<Room>> {
        let room = self
            .write()
            .remove(name)
            .ok_or_else(|| HubError::RoomNotFound(name.to_string()))?;
        let evicted = room.clear_members();
        tracing::debug!(room = name, evicted = evicted.len(), "room deleted");
        Ok(room)
    }

    pub fn get(&self, name: &str) -> Result<Arc<Room>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| HubError::RoomNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn rooms(&self) -> Vec<Arc<Room>> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Rooms `conn` is a member of.
    pub fn rooms_of(&self, conn: &Connection) -> Vec<Arc<Room>> {
        self.rooms()
            .into_iter()
            .filter(|room| room.is_member(conn))
            .collect()
    }

    /// Rooms `conn` may discover.
    pub fn visible_to(&self, conn: &Connection) -> Vec<Arc<Room>> {
        self.rooms()
            .into_iter()
            .filter(|room| room.can_see(conn))
            .collect()
    }

    /// Take `conn` out of every room; returns how many it left.
    pub fn detach(&self, conn: &Connection) -> usize {
        self.rooms()
            .iter()
            .filter(|room| room.remove_member(conn))
            .count()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, Arc<Room>>> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, Arc<Room>>> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }
}
