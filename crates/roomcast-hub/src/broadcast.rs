use std::sync::Arc;

use roomcast_events::EventDescriptor;
use serde_json::Value;

use crate::connection::Connection;
use crate::error::{HubError, Result};

/// How a fan-out puts the event on each connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    /// `send`: this side originates the event.
    Originate,
    /// `relay`: forwarding an event a client sent.
    Relay,
}

pub(crate) fn check_origin(event: &EventDescriptor) -> Result<()> {
    if event.server_to_client() {
        Ok(())
    } else {
        Err(HubError::Direction {
            event: event.name().to_string(),
            reason: "cannot be initiated by the server (if it is only forwarded, use relay)",
        })
    }
}

/// Deliver to a snapshot of connections.
///
/// Direction and payload are checked once up front so a bad call reaches
/// nobody. Per-connection failures after that are logged and skipped.
/// Returns the number of connections reached.
pub(crate) fn fan_out(
    scope: &str,
    targets: &[Arc<Connection>],
    event: &EventDescriptor,
    args: &[Value],
    delivery: Delivery,
) -> Result<usize> {
    if delivery == Delivery::Originate {
        check_origin(event)?;
    }
    event.check_args(args)?;

    let mut reached = 0usize;
    for target in targets {
        let result = match delivery {
            Delivery::Originate => target.send(event, args),
            Delivery::Relay => target.relay(event, args),
        };
        match result {
            Ok(()) => reached += 1,
            Err(err) => tracing::warn!(
                scope,
                connection = target.id(),
                event = event.name(),
                error = %err,
                "broadcast delivery failed"
            ),
        }
    }

    tracing::debug!(
        scope,
        event = event.name(),
        targets = targets.len(),
        reached,
        "broadcast complete"
    );
    Ok(reached)
}
