use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roomcast_events::{EventDescriptor, Taxonomy};
use roomcast_transport::Transport;
use serde_json::Value;

use crate::broadcast::check_origin;
use crate::error::{HubError, Result};
use crate::room::Room;

/// A transport connection bound to an event taxonomy.
///
/// Every outbound message is checked against its event descriptor before it
/// reaches the transport, and nothing is written when a check fails. The
/// binding is fixed for the connection's lifetime.
pub struct Connection {
    transport: Arc<dyn Transport>,
    taxonomy: Arc<Taxonomy>,
    closed: Arc<AtomicBool>,
    rooms: Mutex<BTreeSet<String>>,
}

impl Connection {
    /// Wrap a live transport.
    pub fn new(transport: Arc<dyn Transport>, taxonomy: Arc<Taxonomy>) -> Arc<Self> {
        let closed = Arc::new(AtomicBool::new(false));
        let flag = closed.clone();
        transport.on_close(Box::new(move || flag.store(true, Ordering::SeqCst)));

        Arc::new(Self {
            transport,
            taxonomy,
            closed,
            rooms: Mutex::new(BTreeSet::new()),
        })
    }

    /// Stable identity of the underlying transport.
    pub fn id(&self) -> &str {
        self.transport.id()
    }

    pub fn taxonomy(&self) -> &Arc<Taxonomy> {
        &self.taxonomy
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Originate `event` towards the client.
    ///
    /// Fails with [`HubError::Direction`] unless the event is
    /// `server_to_client`.
    pub fn send(&self, event: &EventDescriptor, args: &[Value]) -> Result<()> {
        self.ensure_open()?;
        self.ensure_known(event)?;
        check_origin(event)?;
        event.check_args(args)?;
        self.write(event, args)
    }

    /// Forward `event` on behalf of its original sender.
    ///
    /// Same payload check as [`send`](Self::send), without the origin check.
    pub fn relay(&self, event: &EventDescriptor, args: &[Value]) -> Result<()> {
        self.ensure_open()?;
        self.ensure_known(event)?;
        event.check_args(args)?;
        self.write(event, args)
    }

    /// Run `handler` for every inbound `event` whose arguments fit its payload.
    ///
    /// Registering for an event clients may not originate is allowed, with a
    /// warning, since internal wiring may legitimately need it.
    pub fn receive<F>(&self, event: &EventDescriptor, handler: F) -> Result<()>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.ensure_open()?;
        self.ensure_known(event)?;
        self.warn_direction(event);

        let descriptor = event.clone();
        let connection = self.id().to_string();
        self.transport.on(
            event.name(),
            Arc::new(move |args: &[Value]| match descriptor.check_args(args) {
                Ok(()) => handler(args),
                Err(err) => drop_inbound(&connection, &err),
            }),
        );
        Ok(())
    }

    /// Like [`receive`](Self::receive), but `handler` runs at most once.
    ///
    /// A first inbound message with a bad payload is dropped and consumes the
    /// registration.
    pub fn receive_once<F>(&self, event: &EventDescriptor, handler: F) -> Result<()>
    where
        F: FnOnce(&[Value]) + Send + 'static,
    {
        self.ensure_open()?;
        self.ensure_known(event)?;
        self.warn_direction(event);

        let descriptor = event.clone();
        let connection = self.id().to_string();
        self.transport.once(
            event.name(),
            Box::new(move |args: &[Value]| match descriptor.check_args(args) {
                Ok(()) => handler(args),
                Err(err) => drop_inbound(&connection, &err),
            }),
        );
        Ok(())
    }

    /// Close the transport. Later sends and registrations fail with
    /// [`HubError::Closed`].
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!(connection = self.id(), "closing connection");
        self.transport.close();
    }

    /// Join `room` if its admission policy allows it.
    pub fn join_room(self: &Arc<Self>, room: &Room) -> Result<bool> {
        self.ensure_open()?;
        Ok(room.add_member(self))
    }

    /// Leave `room`; leaving a room one is not in is a no-op.
    pub fn leave_room(&self, room: &Room) {
        room.remove_member(self);
    }

    /// Names of the rooms this connection is currently a member of.
    pub fn rooms(&self) -> Vec<String> {
        self.room_names().iter().cloned().collect()
    }

    pub(crate) fn note_joined(&self, room: &str) {
        self.room_names().insert(room.to_string());
    }

    pub(crate) fn note_left(&self, room: &str) {
        self.room_names().remove(room);
    }

    fn room_names(&self) -> MutexGuard<'_, BTreeSet<String>> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(HubError::Closed(self.id().to_string()));
        }
        Ok(())
    }

    fn ensure_known(&self, event: &EventDescriptor) -> Result<()> {
        if self.taxonomy.contains_event(event) {
            Ok(())
        } else {
            Err(HubError::UnknownEvent(event.path().to_string()))
        }
    }

    fn warn_direction(&self, event: &EventDescriptor) {
        if !event.client_to_server() {
            tracing::warn!(
                connection = self.id(),
                event = event.name(),
                "listening for an event clients cannot initiate"
            );
        }
    }

    fn write(&self, event: &EventDescriptor, args: &[Value]) -> Result<()> {
        tracing::trace!(
            connection = self.id(),
            event = event.name(),
            args = args.len(),
            "writing event"
        );
        self.transport.send(event.name(), args)?;
        Ok(())
    }
}

fn drop_inbound(connection: &str, err: &roomcast_events::PayloadError) {
    tracing::warn!(connection, error = %err, "dropping inbound event with bad payload");
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id())
            .field("closed", &self.is_closed())
            .field("rooms", &*self.room_names())
            .finish()
    }
}
