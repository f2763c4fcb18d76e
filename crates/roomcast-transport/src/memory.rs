use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::error::{Result, TransportError};
use crate::traits::{CloseHook, Handler, OnceHandler, Transport};

/// One recorded outbound write.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub name: String,
    pub args: Vec<Value>,
}

/// In-process transport recording outbound writes.
///
/// Inbound traffic is injected with [`deliver`](Self::deliver) and a remote
/// hang-up with [`disconnect`](Self::disconnect).
pub struct MemoryTransport {
    id: String,
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    sent: Vec<SentMessage>,
    handlers: HashMap<String, Vec<Handler>>,
    once_handlers: HashMap<String, Vec<OnceHandler>>,
    close_hooks: Vec<CloseHook>,
    closed: bool,
    fail_sends: Option<String>,
}

impl MemoryTransport {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Every write so far, oldest first.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.lock().sent.clone()
    }

    /// Drain recorded writes.
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Make every later send fail with `message`, or succeed again with `None`.
    pub fn fail_sends(&self, message: Option<&str>) {
        self.lock().fail_sends = message.map(str::to_string);
    }

    /// Dispatch an inbound message; returns how many handlers ran.
    ///
    /// Handlers run without the internal lock held, so they may call back
    /// into this transport.
    pub fn deliver(&self, name: &str, args: &[Value]) -> usize {
        let (handlers, once) = {
            let mut state = self.lock();
            if state.closed {
                return 0;
            }
            let handlers = state.handlers.get(name).cloned().unwrap_or_default();
            let once = state.once_handlers.remove(name).unwrap_or_default();
            (handlers, once)
        };

        let count = handlers.len() + once.len();
        for handler in handlers {
            handler(args);
        }
        for handler in once {
            handler(args);
        }
        count
    }

    /// Simulate the remote side hanging up.
    pub fn disconnect(&self) {
        tracing::debug!(id = %self.id, "memory transport disconnected by peer");
        self.shut();
    }

    fn shut(&self) {
        let hooks = {
            let mut state = self.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            state.handlers.clear();
            state.once_handlers.clear();
            std::mem::take(&mut state.close_hooks)
        };
        for hook in hooks {
            hook();
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn id(&self) -> &str {
        &self.id
    }

    fn send(&self, name: &str, args: &[Value]) -> Result<()> {
        let mut state = self.lock();
        if state.closed {
            return Err(TransportError::Closed(self.id.clone()));
        }
        if let Some(message) = &state.fail_sends {
            return Err(TransportError::Send {
                id: self.id.clone(),
                message: message.clone(),
            });
        }
        state.sent.push(SentMessage {
            name: name.to_string(),
            args: args.to_vec(),
        });
        Ok(())
    }

    fn on(&self, name: &str, handler: Handler) {
        self.lock()
            .handlers
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    fn once(&self, name: &str, handler: OnceHandler) {
        self.lock()
            .once_handlers
            .entry(name.to_string())
            .or_default()
            .push(handler);
    }

    fn on_close(&self, hook: CloseHook) {
        let mut state = self.lock();
        if state.closed {
            drop(state);
            hook();
            return;
        }
        state.close_hooks.push(hook);
    }

    fn close(&self) {
        tracing::debug!(id = %self.id, "memory transport closed");
        self.shut();
    }

    fn is_closed(&self) -> bool {
        self.lock().closed
    }
}

impl fmt::Debug for MemoryTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("MemoryTransport")
            .field("id", &self.id)
            .field("sent", &state.sent.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use serde_json::json;

    use super::*;

    #[test]
    fn records_sends_in_order() {
        let transport = MemoryTransport::new("alice");
        transport.send("a", &[json!(1)]).expect("send should succeed");
        transport.send("b", &[]).expect("send should succeed");

        let sent = transport.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].name, "a");
        assert_eq!(sent[0].args, vec![json!(1)]);
        assert_eq!(transport.take_sent().len(), 2);
        assert!(transport.sent().is_empty());
    }

    #[test]
    fn on_runs_every_time_and_once_runs_once() {
        let transport = MemoryTransport::new("alice");
        let on_hits = Arc::new(AtomicUsize::new(0));
        let once_hits = Arc::new(AtomicUsize::new(0));

        let hits = on_hits.clone();
        transport.on(
            "ping",
            Arc::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let hits = once_hits.clone();
        transport.once(
            "ping",
            Box::new(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(transport.deliver("ping", &[]), 2);
        assert_eq!(transport.deliver("ping", &[]), 1);
        assert_eq!(transport.deliver("other", &[]), 0);
        assert_eq!(on_hits.load(Ordering::SeqCst), 2);
        assert_eq!(once_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn close_runs_hooks_once_and_rejects_sends() {
        let transport = MemoryTransport::new("alice");
        let closed = Arc::new(AtomicUsize::new(0));
        let hits = closed.clone();
        transport.on_close(Box::new(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        }));

        transport.disconnect();
        transport.close();
        assert_eq!(closed.load(Ordering::SeqCst), 1);
        assert!(transport.is_closed());
        assert_eq!(
            transport.send("a", &[]),
            Err(TransportError::Closed("alice".to_string()))
        );
        assert_eq!(transport.deliver("a", &[]), 0);

        let late = closed.clone();
        transport.on_close(Box::new(move || {
            late.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn failing_sends_are_reported() {
        let transport = MemoryTransport::new("bob");
        transport.fail_sends(Some("buffer full"));
        assert!(matches!(
            transport.send("a", &[]),
            Err(TransportError::Send { .. })
        ));
        transport.fail_sends(None);
        assert!(transport.send("a", &[]).is_ok());
        assert_eq!(transport.sent().len(), 1);
    }
}
