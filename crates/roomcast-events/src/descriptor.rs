use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::PayloadError;
use crate::param::ParamType;

/// Value-typed handle of an event inside one frozen taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EventId(pub(crate) u32);

impl EventId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One positional payload argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadParam {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParamType,
}

/// An event: its name, payload shape and allowed origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventDescriptor {
    pub(crate) id: EventId,
    pub(crate) path: String,
    pub(crate) name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    pub(crate) payload: Vec<PayloadParam>,
    pub(crate) server_to_client: bool,
    pub(crate) client_to_server: bool,
    pub(crate) internal: bool,
}

impl EventDescriptor {
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Position in the taxonomy, e.g. `chat::message`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Name written on the transport.
    ///
    /// Equal to [`path`](Self::path), except for internal events which keep
    /// only the last path segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn payload(&self) -> &[PayloadParam] {
        &self.payload
    }

    /// The server may originate this event.
    pub fn server_to_client(&self) -> bool {
        self.server_to_client
    }

    /// A client may originate this event.
    pub fn client_to_server(&self) -> bool {
        self.client_to_server
    }

    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Check positional arguments against the declared payload.
    pub fn check_args(&self, args: &[Value]) -> Result<(), PayloadError> {
        if args.len() != self.payload.len() {
            return Err(PayloadError::Arity {
                event: self.name.clone(),
                expected: self.payload.len(),
                actual: args.len(),
            });
        }

        for (index, (arg, param)) in args.iter().zip(&self.payload).enumerate() {
            if !param.kind.matches(arg) {
                return Err(PayloadError::Type {
                    event: self.name.clone(),
                    index,
                    param: param.name.clone(),
                    expected: param.kind,
                    actual: ParamType::describe(arg),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chat_message() -> EventDescriptor {
        EventDescriptor {
            id: EventId(0),
            path: "chat::message".to_string(),
            name: "chat::message".to_string(),
            description: None,
            payload: vec![
                PayloadParam {
                    name: "username".to_string(),
                    kind: ParamType::String,
                },
                PayloadParam {
                    name: "msg".to_string(),
                    kind: ParamType::String,
                },
            ],
            server_to_client: true,
            client_to_server: true,
            internal: false,
        }
    }

    #[test]
    fn accepts_matching_args() {
        assert!(chat_message().check_args(&[json!("alice"), json!("hi")]).is_ok());
    }

    #[test]
    fn arity_mismatch_names_counts() {
        let err = chat_message()
            .check_args(&[json!("alice")])
            .expect_err("one argument should fail");
        assert_eq!(
            err,
            PayloadError::Arity {
                event: "chat::message".to_string(),
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn type_mismatch_names_index_and_types() {
        let err = chat_message()
            .check_args(&[json!("alice"), json!(42)])
            .expect_err("number for string should fail");
        assert_eq!(
            err.to_string(),
            "invalid type for argument 1 (\"msg\") of \"chat::message\", expected string got int"
        );
    }

    #[test]
    fn displays_wire_name() {
        assert_eq!(chat_message().to_string(), "chat::message");
    }
}
