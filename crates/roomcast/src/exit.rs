use std::fmt;

use roomcast_events::EventError;
use roomcast_hub::HubError;
use roomcast_schema::SchemaError;

// Exit codes shared by every subcommand.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn schema_error(context: &str, err: SchemaError) -> CliError {
    let code = match err {
        SchemaError::Load(_) => FAILURE,
        SchemaError::InvalidJson(_)
        | SchemaError::Contract { .. }
        | SchemaError::ValidationFailed(_) => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn event_error(context: &str, err: EventError) -> CliError {
    match err {
        EventError::Schema(err) => schema_error(context, err),
        EventError::UnknownEvent(_) | EventError::UnknownNamespace(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        EventError::Definition { .. } | EventError::Structure { .. } | EventError::Json(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn hub_error(context: &str, err: HubError) -> CliError {
    match err {
        HubError::Event(err) => event_error(context, err),
        HubError::Schema(err) => schema_error(context, err),
        HubError::Direction { .. } | HubError::Payload(_) | HubError::Settings(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        HubError::UnknownEvent(_) | HubError::RoomNotFound(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        HubError::Closed(_) | HubError::Transport(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use roomcast_schema::Mismatch;

    use super::*;

    #[test]
    fn validation_failures_are_data_invalid() {
        let err = schema_error(
            "check",
            SchemaError::ValidationFailed(Mismatch {
                path: "root.port".to_string(),
                reason: "is not an int".to_string(),
            }),
        );
        assert_eq!(err.code, DATA_INVALID);
        assert_eq!(err.message, "check: validation failed: the node \"root.port\" is not an int");
    }

    #[test]
    fn lookups_are_usage_errors() {
        let err = hub_error(
            "emit",
            HubError::Event(EventError::UnknownEvent("chat::nope".to_string())),
        );
        assert_eq!(err.code, USAGE);
        assert_eq!(hub_error("rooms", HubError::RoomNotFound("x".into())).code, USAGE);
    }

    #[test]
    fn unreadable_files_are_plain_failures() {
        let err = hub_error(
            "rooms",
            HubError::Schema(SchemaError::Load("failed opening x".to_string())),
        );
        assert_eq!(err.code, FAILURE);
    }
}
