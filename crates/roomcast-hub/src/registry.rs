use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use roomcast_events::{EventDescriptor, Taxonomy};
use roomcast_transport::Transport;
use serde_json::Value;

use crate::broadcast::{fan_out, Delivery};
use crate::connection::Connection;
use crate::directory::RoomDirectory;
use crate::error::{HubError, Result};

/// Callback run for every accepted connection.
pub type ConnectHandler = Arc<dyn Fn(&Arc<Connection>) + Send + Sync>;

/// Accepts transports and tracks the live connections built on them.
///
/// A connection is forgotten as soon as its transport reports closure.
pub struct ConnectionRegistry {
    taxonomy: Arc<Taxonomy>,
    directory: Option<Arc<RoomDirectory>>,
    inner: Arc<Mutex<RegistryState>>,
}

#[derive(Default)]
struct RegistryState {
    connections: Vec<Arc<Connection>>,
    handlers: Vec<ConnectHandler>,
}

impl ConnectionRegistry {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            directory: None,
            inner: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Also remove closed connections from every room of `directory`.
    pub fn with_directory(mut self, directory: Arc<RoomDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    /// Register a callback for connections accepted from now on.
    pub fn on_connect<F>(&self, handler: F)
    where
        F: Fn(&Arc<Connection>) + Send + Sync + 'static,
    {
        lock(&self.inner).handlers.push(Arc::new(handler));
    }

    /// Wrap `transport`, track the connection and run the connect callbacks.
    pub fn accept(&self, transport: Arc<dyn Transport>) -> Result<Arc<Connection>> {
        if transport.is_closed() {
            return Err(HubError::Closed(transport.id().to_string()));
        }

        let conn = Connection::new(transport.clone(), self.taxonomy.clone());
        let handlers = {
            let mut state = lock(&self.inner);
            state.connections.push(conn.clone());
            state.handlers.clone()
        };

        let registry = Arc::downgrade(&self.inner);
        let tracked = Arc::downgrade(&conn);
        let directory = self.directory.clone();
        transport.on_close(Box::new(move || {
            forget(&registry, &tracked, directory.as_deref());
        }));

        tracing::debug!(connection = conn.id(), "connection accepted");
        for handler in handlers {
            handler(&conn);
        }
        Ok(conn)
    }

    /// Snapshot of the live connections, oldest first.
    pub fn connections(&self) -> Vec<Arc<Connection>> {
        lock(&self.inner).connections.clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Connection>> {
        lock(&self.inner)
            .connections
            .iter()
            .find(|conn| conn.id() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).connections.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.inner).connections.is_empty()
    }

    /// Originate `event` on every live connection.
    pub fn broadcast_all(&self, event: &EventDescriptor, args: &[Value]) -> Result<usize> {
        fan_out("*", &self.connections(), event, args, Delivery::Originate)
    }

    /// Relay `event` to every live connection.
    pub fn relay_all(&self, event: &EventDescriptor, args: &[Value]) -> Result<usize> {
        fan_out("*", &self.connections(), event, args, Delivery::Relay)
    }
}

impl std::fmt::Debug for ConnectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionRegistry")
            .field("connections", &self.len())
            .field("events", &self.taxonomy.len())
            .finish()
    }
}

fn forget(
    registry: &Weak<Mutex<RegistryState>>,
    tracked: &Weak<Connection>,
    directory: Option<&RoomDirectory>,
) {
    let (Some(registry), Some(conn)) = (registry.upgrade(), tracked.upgrade()) else {
        return;
    };
    lock(&registry)
        .connections
        .retain(|other| !Arc::ptr_eq(other, &conn));
    let left = directory.map_or(0, |directory| directory.detach(&conn));
    tracing::debug!(connection = conn.id(), rooms_left = left, "connection closed");
}

fn lock(inner: &Mutex<RegistryState>) -> MutexGuard<'_, RegistryState> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use roomcast_transport::MemoryTransport;
    use serde_json::json;

    use super::*;
    use crate::testing::taxonomy;

    fn transport(id: &str) -> Arc<MemoryTransport> {
        Arc::new(MemoryTransport::new(id))
    }

    #[test]
    fn accept_runs_handlers_and_tracks() {
        let registry = ConnectionRegistry::new(taxonomy());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        registry.on_connect(move |conn| {
            assert!(!conn.is_closed());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let alice = registry.accept(transport("alice")).expect("accept should succeed");
        registry.accept(transport("bob")).expect("accept should succeed");

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(registry.len(), 2);
        assert!(Arc::ptr_eq(
            &registry.get("alice").expect("alice should be tracked"),
            &alice
        ));
        assert!(registry.get("carol").is_none());
    }

    #[test]
    fn closed_transports_are_forgotten() {
        let registry = ConnectionRegistry::new(taxonomy());
        let t_alice = transport("alice");
        let alice = registry.accept(t_alice.clone()).expect("accept should succeed");
        let bob = registry.accept(transport("bob")).expect("accept should succeed");

        t_alice.disconnect();
        assert!(alice.is_closed());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("alice").is_none());

        bob.close();
        assert!(registry.is_empty());
    }

    #[test]
    fn accept_refuses_closed_transport() {
        let registry = ConnectionRegistry::new(taxonomy());
        let t = transport("alice");
        t.close();
        assert!(matches!(registry.accept(t), Err(HubError::Closed(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn closing_detaches_from_rooms() {
        let directory = Arc::new(RoomDirectory::new());
        let lobby = directory.create("lobby").expect("room should be created");
        let registry = ConnectionRegistry::new(taxonomy()).with_directory(directory.clone());
        let room = lobby.clone();
        registry.on_connect(move |conn| {
            conn.join_room(&room).expect("join should not error");
        });

        let t_alice = transport("alice");
        let alice = registry.accept(t_alice.clone()).expect("accept should succeed");
        assert!(lobby.is_member(&alice));

        t_alice.disconnect();
        assert!(lobby.is_empty());
    }

    #[test]
    fn broadcast_all_reaches_every_connection() {
        let registry = ConnectionRegistry::new(taxonomy());
        let ta = transport("alice");
        let tb = transport("bob");
        registry.accept(ta.clone()).expect("accept should succeed");
        registry.accept(tb.clone()).expect("accept should succeed");
        let tax = registry.taxonomy().clone();

        let info = tax.event("system.info").unwrap();
        assert_eq!(
            registry
                .broadcast_all(info, &[json!(1), json!("restart")])
                .expect("broadcast should succeed"),
            2
        );

        let typing = tax.event("chat.typing").unwrap();
        assert!(matches!(
            registry.broadcast_all(typing, &[json!("alice")]),
            Err(HubError::Direction { .. })
        ));
        assert_eq!(
            registry
                .relay_all(typing, &[json!("alice")])
                .expect("relay should succeed"),
            2
        );
        assert_eq!(ta.sent().len(), 2);
        assert_eq!(tb.sent()[1].name, "chat::typing");
    }
}
