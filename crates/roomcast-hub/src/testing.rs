use std::sync::Arc;

use roomcast_events::Taxonomy;
use roomcast_transport::MemoryTransport;

use crate::connection::Connection;

pub(crate) const DEFINITIONS: &str = r#"{
    "chat": {
        "type": "namespace",
        "message": {
            "type": "event",
            "payload": [
                { "name": "username", "type": "string" },
                { "name": "msg", "type": "string" }
            ],
            "server_to_client": true,
            "client_to_server": true
        },
        "typing": {
            "type": "event",
            "payload": [{ "name": "username", "type": "string" }],
            "client_to_server": true
        },
        "user_joined": {
            "type": "event",
            "payload": [{ "name": "username", "type": "string" }],
            "server_to_client": true
        }
    },
    "system": {
        "type": "namespace",
        "info": {
            "type": "event",
            "payload": [
                { "name": "timestamp", "type": "int" },
                { "name": "text", "type": "string" }
            ],
            "server_to_client": true
        }
    },
    "misc": {
        "type": "namespace",
        "username": {
            "type": "event",
            "payload": [{ "name": "username", "type": "string" }],
            "client_to_server": true
        }
    },
    "internal": {
        "type": "namespace",
        "kicked": {
            "type": "event",
            "internal": true,
            "payload": [{ "name": "reason", "type": "string" }],
            "server_to_client": true
        }
    }
}"#;

pub(crate) fn taxonomy() -> Arc<Taxonomy> {
    Arc::new(Taxonomy::from_json_str(DEFINITIONS).expect("test definitions should build"))
}

pub(crate) fn connect(id: &str) -> (Arc<MemoryTransport>, Arc<Connection>) {
    connect_with(id, taxonomy())
}

pub(crate) fn connect_with(
    id: &str,
    taxonomy: Arc<Taxonomy>,
) -> (Arc<MemoryTransport>, Arc<Connection>) {
    let transport = Arc::new(MemoryTransport::new(id));
    let conn = Connection::new(transport.clone(), taxonomy);
    (transport, conn)
}
