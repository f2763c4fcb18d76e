//! Hub settings document.
//!
//! ```json
//! {
//!     "main_room_name": "general",
//!     "default_rooms": [
//!         { "name": "general" },
//!         { "name": "staff", "visible": false, "whitelist": true, "userlist": ["alice"] }
//!     ],
//!     "definitions": "events.json"
//! }
//! ```

use std::path::{Path, PathBuf};

use roomcast_events::Taxonomy;
use roomcast_schema::{read_document, SchemaNode, Validator, ValidatorConfig};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{HubError, Result};

/// A room created at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSpec {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Treat `userlist` as an allow-list instead of a deny-list.
    #[serde(default)]
    pub whitelist: bool,
    #[serde(default)]
    pub userlist: Vec<String>,
}

fn default_visible() -> bool {
    true
}

/// Startup configuration for a hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubSettings {
    /// Room every new connection lands in.
    #[serde(rename = "main_room_name")]
    pub main_room: String,
    pub default_rooms: Vec<RoomSpec>,
    /// Event definitions document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<PathBuf>,
}

/// Structure a settings document must match before it is deserialized.
pub fn settings_contract() -> Result<SchemaNode> {
    let contract = json!({
        "type": "dict",
        "content": {
            "main_room_name": { "type": "string", "required": true, "min_length": 1 },
            "default_rooms": {
                "type": "list",
                "required": true,
                "content_template": {
                    "type": "dict",
                    "content": {
                        "name": { "type": "string", "required": true, "min_length": 1 },
                        "visible": { "type": "boolean" },
                        "whitelist": { "type": "boolean" },
                        "userlist": {
                            "type": "list",
                            "content_template": { "type": "string", "min_length": 1 }
                        }
                    }
                }
            },
            "definitions": { "type": "string", "min_length": 1 }
        }
    });
    Ok(SchemaNode::from_value(&contract)?)
}

impl HubSettings {
    /// Check `value` against [`settings_contract`], then deserialize it.
    pub fn from_value(value: &Value) -> Result<Self> {
        Validator::new(settings_contract()?)
            .validate(value)
            .map_err(|mismatch| HubError::Settings(mismatch.to_string()))?;

        let settings: HubSettings = serde_json::from_value(value.clone())
            .map_err(|err| HubError::Settings(err.to_string()))?;
        settings.check_rooms()?;
        Ok(settings)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|err| HubError::Settings(err.to_string()))?;
        Self::from_value(&value)
    }

    /// Load a settings file. A relative `definitions` path is resolved
    /// against the file's directory.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_document(path, ValidatorConfig::default().max_document_size)?;
        let mut settings = Self::from_value(&value)?;

        if let (Some(definitions), Some(dir)) = (&settings.definitions, path.parent()) {
            if definitions.is_relative() {
                settings.definitions = Some(dir.join(definitions));
            }
        }
        tracing::debug!(
            path = %path.display(),
            rooms = settings.default_rooms.len(),
            "hub settings loaded"
        );
        Ok(settings)
    }

    /// Build the taxonomy named by `definitions`.
    pub fn load_taxonomy(&self) -> Result<Taxonomy> {
        let path = self
            .definitions
            .as_deref()
            .ok_or_else(|| HubError::Settings("no definitions file configured".to_string()))?;
        Ok(Taxonomy::from_path(path)?)
    }

    fn check_rooms(&self) -> Result<()> {
        let mut seen = std::collections::BTreeSet::new();
        for room in &self.default_rooms {
            if !seen.insert(room.name.as_str()) {
                return Err(HubError::Settings(format!(
                    "room \"{}\" is declared twice",
                    room.name
                )));
            }
        }
        if !seen.contains(self.main_room.as_str()) {
            return Err(HubError::Settings(format!(
                "main room \"{}\" is not one of the default rooms",
                self.main_room
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::testing::DEFINITIONS;

    const SETTINGS: &str = r#"{
        "main_room_name": "general",
        "default_rooms": [
            { "name": "general" },
            { "name": "staff", "visible": false, "whitelist": true, "userlist": ["alice"] }
        ]
    }"#;

    #[test]
    fn parses_rooms_with_defaults() {
        let settings = HubSettings::from_json_str(SETTINGS).expect("settings should parse");
        assert_eq!(settings.main_room, "general");
        assert_eq!(
            settings.default_rooms[0],
            RoomSpec {
                name: "general".to_string(),
                visible: true,
                whitelist: false,
                userlist: Vec::new(),
            }
        );
        assert!(settings.default_rooms[1].whitelist);
        assert!(settings.definitions.is_none());
    }

    #[test]
    fn structure_mismatch_names_the_node() {
        let err = HubSettings::from_json_str(
            r#"{"main_room_name": "general", "default_rooms": [{"name": "general", "visible": "yes"}]}"#,
        )
        .expect_err("string visible should fail");
        assert!(matches!(err, HubError::Settings(_)));
        assert!(err.to_string().contains("root.default_rooms.0.visible"));

        assert!(HubSettings::from_json_str(r#"{"default_rooms": []}"#).is_err());
    }

    #[test]
    fn main_room_must_exist() {
        let err = HubSettings::from_json_str(
            r#"{"main_room_name": "lobby", "default_rooms": [{"name": "general"}]}"#,
        )
        .expect_err("unknown main room should fail");
        assert!(err.to_string().contains("lobby"));
    }

    #[test]
    fn duplicate_rooms_are_rejected() {
        assert!(HubSettings::from_json_str(
            r#"{"main_room_name": "general", "default_rooms": [{"name": "general"}, {"name": "general"}]}"#,
        )
        .is_err());
    }

    #[test]
    fn relative_definitions_resolve_against_settings_dir() {
        let dir = std::env::temp_dir().join(format!(
            "roomcast-settings-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        fs::write(dir.join("events.json"), DEFINITIONS).expect("definitions should be written");
        fs::write(
            dir.join("settings.json"),
            r#"{"main_room_name": "general", "default_rooms": [{"name": "general"}], "definitions": "events.json"}"#,
        )
        .expect("settings should be written");

        let settings = HubSettings::from_path(dir.join("settings.json")).expect("settings should load");
        assert_eq!(settings.definitions, Some(dir.join("events.json")));

        let taxonomy = settings.load_taxonomy().expect("definitions should build");
        assert!(taxonomy.event("chat::message").is_ok());

        fs::remove_dir_all(&dir).expect("temp dir should be removed");
    }

    #[test]
    fn load_taxonomy_without_definitions_fails() {
        let settings = HubSettings::from_json_str(SETTINGS).expect("settings should parse");
        assert!(matches!(settings.load_taxonomy(), Err(HubError::Settings(_))));
    }
}
