use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roomcast_events::EventDescriptor;
use serde::Serialize;
use serde_json::Value;

use crate::broadcast::{fan_out, Delivery};
use crate::config::RoomSpec;
use crate::connection::Connection;
use crate::error::{HubError, Result};

/// A named group of connections with an admission policy.
///
/// The identity list is an allow-list when `use_as_whitelist` is set and a
/// deny-list otherwise. Identities are connection ids.
#[derive(Debug)]
pub struct Room {
    name: String,
    state: Mutex<RoomState>,
}

#[derive(Debug, Default)]
struct RoomState {
    members: BTreeMap<String, Arc<Connection>>,
    list: BTreeSet<String>,
    use_as_whitelist: bool,
    visible: bool,
}

impl RoomState {
    fn admits(&self, identity: &str) -> bool {
        self.list.contains(identity) == self.use_as_whitelist
    }

    fn holds(&self, conn: &Connection) -> bool {
        self.members
            .get(conn.id())
            .is_some_and(|member| std::ptr::eq(Arc::as_ptr(member), conn))
    }
}

/// Point-in-time summary of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomInfo {
    pub name: String,
    pub visible: bool,
    pub use_as_whitelist: bool,
    pub list: Vec<String>,
    pub members: Vec<String>,
}

impl Room {
    /// A visible room with an empty deny-list.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(RoomState {
                visible: true,
                ..RoomState::default()
            }),
        }
    }

    pub fn from_spec(spec: &RoomSpec) -> Self {
        Self {
            name: spec.name.clone(),
            state: Mutex::new(RoomState {
                members: BTreeMap::new(),
                list: spec.userlist.iter().cloned().collect(),
                use_as_whitelist: spec.whitelist,
                visible: spec.visible,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn set_visible(&self, visible: bool) {
        self.lock().visible = visible;
    }

    pub fn uses_whitelist(&self) -> bool {
        self.lock().use_as_whitelist
    }

    /// Switch list mode. A real switch empties the identity list.
    pub fn set_use_as_whitelist(&self, use_as_whitelist: bool) {
        let mut state = self.lock();
        if state.use_as_whitelist == use_as_whitelist {
            return;
        }
        state.use_as_whitelist = use_as_whitelist;
        state.list.clear();
        tracing::debug!(room = %self.name, use_as_whitelist, "room list mode switched");
    }

    /// Add an identity to the list in whatever mode it is in.
    pub fn add_to_list(&self, identity: impl Into<String>) -> bool {
        self.lock().list.insert(identity.into())
    }

    pub fn remove_from_list(&self, identity: &str) -> bool {
        self.lock().list.remove(identity)
    }

    /// Allow `identity`; fails unless the room is in allow-list mode.
    pub fn add_to_whitelist(&self, identity: impl Into<String>) -> Result<bool> {
        self.add_in_mode(identity.into(), true)
    }

    /// Deny `identity`; fails unless the room is in deny-list mode.
    pub fn add_to_blacklist(&self, identity: impl Into<String>) -> Result<bool> {
        self.add_in_mode(identity.into(), false)
    }

    fn add_in_mode(&self, identity: String, whitelist: bool) -> Result<bool> {
        let mut state = self.lock();
        if state.use_as_whitelist != whitelist {
            return Err(HubError::ListMode {
                room: self.name.clone(),
                expected: if whitelist { "whitelist" } else { "blacklist" },
            });
        }
        Ok(state.list.insert(identity))
    }

    pub fn list(&self) -> Vec<String> {
        self.lock().list.iter().cloned().collect()
    }

    pub fn can_join(&self, conn: &Connection) -> bool {
        self.can_join_identity(conn.id())
    }

    pub fn can_join_identity(&self, identity: &str) -> bool {
        self.lock().admits(identity)
    }

    /// Visible rooms are discoverable by everyone, hidden ones only by those
    /// admitted to them.
    pub fn can_see(&self, conn: &Connection) -> bool {
        self.can_see_identity(conn.id())
    }

    pub fn can_see_identity(&self, identity: &str) -> bool {
        let state = self.lock();
        state.visible || state.admits(identity)
    }

    /// Admit `conn` if the current policy allows it. Joining twice is a
    /// successful no-op.
    ///
    /// The connection's room index is updated under the room lock, so it
    /// never disagrees with the member set. Lock order is room, then
    /// connection.
    pub fn add_member(&self, conn: &Arc<Connection>) -> bool {
        let mut state = self.lock();
        if !state.admits(conn.id()) {
            tracing::debug!(room = %self.name, connection = conn.id(), "admission refused");
            return false;
        }
        if state.holds(conn) {
            return true;
        }
        // A stale connection with the same identity is displaced.
        if let Some(old) = state.members.insert(conn.id().to_string(), conn.clone()) {
            old.note_left(&self.name);
        }
        conn.note_joined(&self.name);
        drop(state);

        tracing::debug!(room = %self.name, connection = conn.id(), "member joined");
        true
    }

    /// Remove `conn`; removing a non-member does nothing.
    pub fn remove_member(&self, conn: &Connection) -> bool {
        let mut state = self.lock();
        let removed = state.holds(conn) && state.members.remove(conn.id()).is_some();
        if removed {
            conn.note_left(&self.name);
        }
        drop(state);

        if removed {
            tracing::debug!(room = %self.name, connection = conn.id(), "member left");
        }
        removed
    }

    /// Force `conn` out without touching the list; it may rejoin.
    pub fn kick(&self, conn: &Connection) -> bool {
        let kicked = self.remove_member(conn);
        if kicked {
            tracing::info!(room = %self.name, connection = conn.id(), "member kicked");
        }
        kicked
    }

    /// Remove `conn` and exclude its identity from future admission.
    pub fn ban(&self, conn: &Connection) {
        self.remove_member(conn);
        {
            let mut state = self.lock();
            let identity = conn.id();
            if state.use_as_whitelist {
                state.list.remove(identity);
            } else {
                state.list.insert(identity.to_string());
            }
        }
        tracing::info!(room = %self.name, connection = conn.id(), "identity banned");
    }

    /// Lift a ban. Only meaningful in deny-list mode.
    pub fn unban(&self, identity: &str) -> Result<bool> {
        let mut state = self.lock();
        if state.use_as_whitelist {
            return Err(HubError::ListMode {
                room: self.name.clone(),
                expected: "blacklist",
            });
        }
        Ok(state.list.remove(identity))
    }

    pub fn is_member(&self, conn: &Connection) -> bool {
        self.lock().holds(conn)
    }

    /// Current members, in identity order.
    pub fn members(&self) -> Vec<Arc<Connection>> {
        self.lock().members.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().members.is_empty()
    }

    /// Originate `event` to every member present at call time.
    pub fn emit(&self, event: &EventDescriptor, args: &[Value]) -> Result<usize> {
        let targets = self.members();
        fan_out(&self.name, &targets, event, args, Delivery::Originate)
    }

    /// Relay `event` to every member present at call time.
    pub fn transmit(&self, event: &EventDescriptor, args: &[Value]) -> Result<usize> {
        let targets = self.members();
        fan_out(&self.name, &targets, event, args, Delivery::Relay)
    }

    /// Listen for `event` on every member present at call time.
    ///
    /// Unlike [`Connection::receive`], which only warns, this fails with
    /// [`HubError::Direction`] unless clients may originate the event.
    /// Members joining later are not covered. Returns how many members the
    /// handler was registered on; closed members are skipped.
    pub fn receive<F>(&self, event: &EventDescriptor, handler: F) -> Result<usize>
    where
        F: Fn(&Connection, &[Value]) + Send + Sync + 'static,
    {
        if !event.client_to_server() {
            return Err(HubError::Direction {
                event: event.name().to_string(),
                reason: "cannot be initiated by clients",
            });
        }

        let handler = Arc::new(handler);
        let mut registered = 0usize;
        for member in self.members() {
            let handler = handler.clone();
            let source = Arc::downgrade(&member);
            let result = member.receive(event, move |args: &[Value]| {
                if let Some(source) = source.upgrade() {
                    handler(&source, args);
                }
            });
            match result {
                Ok(()) => registered += 1,
                Err(err) => tracing::warn!(
                    room = %self.name,
                    connection = member.id(),
                    event = event.name(),
                    error = %err,
                    "room listener not registered"
                ),
            }
        }
        Ok(registered)
    }

    pub fn info(&self) -> RoomInfo {
        let state = self.lock();
        RoomInfo {
            name: self.name.clone(),
            visible: state.visible,
            use_as_whitelist: state.use_as_whitelist,
            list: state.list.iter().cloned().collect(),
            members: state.members.keys().cloned().collect(),
        }
    }

    /// Drop every member, returning them.
    pub(crate) fn clear_members(&self) -> Vec<Arc<Connection>> {
        let mut state = self.lock();
        let members: Vec<_> = std::mem::take(&mut state.members).into_values().collect();
        for member in &members {
            member.note_left(&self.name);
        }
        members
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
