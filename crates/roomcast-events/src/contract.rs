use roomcast_schema::SchemaNode;
use serde_json::json;

use crate::error::Result;
use crate::param::ParamType;

/// Structure every event node of a definitions document must match.
pub fn event_node_contract() -> Result<SchemaNode> {
    let contract = json!({
        "type": "dict",
        "content": {
            "type": { "type": "string", "required": true, "values": ["event"] },
            "description": { "type": "string" },
            "payload": {
                "type": "list",
                "content_template": {
                    "type": "dict",
                    "content": {
                        "name": { "type": "string", "required": true, "min_length": 1 },
                        "type": { "type": "string", "required": true, "values": ParamType::NAMES }
                    }
                }
            },
            "server_to_client": { "type": "boolean" },
            "client_to_server": { "type": "boolean" },
            "internal": { "type": "boolean" }
        }
    });
    Ok(SchemaNode::from_value(&contract)?)
}

/// Structure every namespace node must match.
///
/// Only `type` and `description` are reserved. Every other key is a child,
/// whatever its name, and is checked on its own once its type is known.
pub fn namespace_node_contract() -> Result<SchemaNode> {
    let contract = json!({
        "type": "dict",
        "content": {
            "type": { "type": "string", "required": true, "values": ["namespace"] },
            "description": { "type": "string" }
        }
    });
    Ok(SchemaNode::from_value(&contract)?)
}
