use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use roomcast_schema::{read_document, Validator, ValidatorConfig};
use serde_json::{Map, Value};

use crate::contract::{event_node_contract, namespace_node_contract};
use crate::descriptor::{EventDescriptor, EventId, PayloadParam};
use crate::error::{EventError, Result};
use crate::param::ParamType;

/// Separator between path segments.
pub const PATH_SEPARATOR: &str = "::";

/// A namespace child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    Namespace(Namespace),
    Event(EventId),
}

/// A grouping node of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    path: String,
    description: Option<String>,
    children: BTreeMap<String, Child>,
}

impl Namespace {
    /// Path of this namespace; empty for the root.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Children keyed by lower-cased name.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Child)> {
        self.children.iter().map(|(name, child)| (name.as_str(), child))
    }

    pub fn child(&self, name: &str) -> Option<&Child> {
        self.children.get(&name.to_lowercase())
    }

    /// Returns true if `path` lies at or below this namespace.
    ///
    /// Containment is per segment: `chat` contains `chat::message` but not
    /// `chatroom::message`.
    pub fn contains(&self, path: &str) -> bool {
        let path = normalize_path(path);
        if self.path.is_empty() || path == self.path {
            return true;
        }
        path.strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
    }

    /// Returns true if the event's tree position lies inside this namespace.
    pub fn contains_event(&self, event: &EventDescriptor) -> bool {
        self.contains(event.path())
    }
}

/// Frozen tree of namespaces and events built from a definitions document.
///
/// There is no mutating API: share it as `Arc<Taxonomy>` and rebuild from an
/// updated document to change it.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    root: Namespace,
    events: Vec<EventDescriptor>,
    by_path: HashMap<String, EventId>,
}

impl Taxonomy {
    /// Build from a parsed definitions document.
    pub fn build(definitions: &Value) -> Result<Self> {
        let root = definitions
            .as_object()
            .ok_or_else(|| EventError::definition("<root>", "definitions must be an object"))?;

        let mut builder = Builder::new()?;
        let root = builder.namespace(root, String::new())?;

        let by_path = builder
            .events
            .iter()
            .map(|event| (event.path.clone(), event.id))
            .collect();

        tracing::debug!(events = builder.events.len(), "event taxonomy built");
        Ok(Self {
            root,
            events: builder.events,
            by_path,
        })
    }

    /// Build from definitions JSON text.
    pub fn from_json_str(definitions: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(definitions)?;
        Self::build(&value)
    }

    /// Build from a definitions file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = read_document(path, ValidatorConfig::default().max_document_size)?;
        tracing::debug!(path = %path.display(), "loading event definitions");
        Self::build(&value)
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    /// Resolve an event by path. `chat::message`, `chat.message` and
    /// `CHAT.MESSAGE` all name the same event.
    pub fn event(&self, path: &str) -> Result<&EventDescriptor> {
        let path = normalize_path(path);
        self.by_path
            .get(&path)
            .map(|id| &self.events[id.index()])
            .ok_or(EventError::UnknownEvent(path))
    }

    /// Resolve a namespace by path; the empty path is the root.
    pub fn namespace(&self, path: &str) -> Result<&Namespace> {
        let path = normalize_path(path);
        if path.is_empty() {
            return Ok(&self.root);
        }

        let mut current = &self.root;
        for segment in path.split(PATH_SEPARATOR) {
            current = match current.children.get(segment) {
                Some(Child::Namespace(ns)) => ns,
                _ => return Err(EventError::UnknownNamespace(path)),
            };
        }
        Ok(current)
    }

    /// Resolve an event handle.
    pub fn descriptor(&self, id: EventId) -> Result<&EventDescriptor> {
        self.events
            .get(id.index())
            .ok_or_else(|| EventError::UnknownEvent(format!("#{}", id.index())))
    }

    /// Returns true if `event` is one of this taxonomy's own descriptors.
    pub fn contains_event(&self, event: &EventDescriptor) -> bool {
        self.events.get(event.id.index()) == Some(event)
    }

    /// Every event in build order.
    pub fn events(&self) -> impl Iterator<Item = &EventDescriptor> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

struct Builder {
    namespace_contract: Validator,
    event_contract: Validator,
    events: Vec<EventDescriptor>,
    wire_names: HashMap<String, String>,
}

impl Builder {
    fn new() -> Result<Self> {
        Ok(Self {
            namespace_contract: Validator::new(namespace_node_contract()?),
            event_contract: Validator::new(event_node_contract()?),
            events: Vec::new(),
            wire_names: HashMap::new(),
        })
    }

    fn namespace(&mut self, node: &Map<String, Value>, path: String) -> Result<Namespace> {
        let mut description = None;
        let mut children = BTreeMap::new();

        for (key, child) in node {
            match key.as_str() {
                "type" => continue,
                "description" => {
                    let text = child.as_str().ok_or_else(|| {
                        EventError::definition(&path, "\"description\" must be a string")
                    })?;
                    description = Some(text.to_string());
                    continue;
                }
                _ => {}
            }

            check_key(&path, key)?;
            let name = key.to_lowercase();
            let child_path = join_path(&path, &name);
            if children.contains_key(&name) {
                return Err(EventError::definition(&child_path, "duplicate name"));
            }

            let child_node = child
                .as_object()
                .ok_or_else(|| EventError::definition(&child_path, "node must be an object"))?;

            let built = match child_node.get("type").and_then(Value::as_str) {
                Some("namespace") => {
                    conform(&self.namespace_contract, child, &child_path)?;
                    Child::Namespace(self.namespace(child_node, child_path)?)
                }
                Some("event") => {
                    conform(&self.event_contract, child, &child_path)?;
                    Child::Event(self.event(child_node, child_path)?)
                }
                Some(other) => {
                    return Err(EventError::definition(
                        &child_path,
                        format!("unknown type \"{other}\""),
                    ))
                }
                None => {
                    return Err(EventError::definition(
                        &child_path,
                        "missing type, expected \"namespace\" or \"event\"",
                    ))
                }
            };
            children.insert(name, built);
        }

        Ok(Namespace {
            path,
            description,
            children,
        })
    }

    fn event(&mut self, node: &Map<String, Value>, path: String) -> Result<EventId> {
        let mut payload = Vec::new();
        if let Some(params) = node.get("payload").and_then(Value::as_array) {
            for (index, param) in params.iter().enumerate() {
                let param_path = format!("{path}.payload.{index}");
                let name = param
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| EventError::definition(&param_path, "missing name"))?;
                let kind = param
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| EventError::definition(&param_path, "missing type"))?
                    .parse::<ParamType>()
                    .map_err(|message| EventError::definition(&param_path, message))?;
                payload.push(PayloadParam {
                    name: name.to_string(),
                    kind,
                });
            }
        }

        let flag = |key: &str| node.get(key).and_then(Value::as_bool).unwrap_or(false);
        let internal = flag("internal");
        let name = if internal {
            path.rsplit(PATH_SEPARATOR).next().unwrap_or(&path).to_string()
        } else {
            path.clone()
        };

        if let Some(previous) = self.wire_names.insert(name.clone(), path.clone()) {
            return Err(EventError::definition(
                &path,
                format!("wire name \"{name}\" is already used by \"{previous}\""),
            ));
        }

        let id = EventId(u32::try_from(self.events.len()).map_err(|_| {
            EventError::definition(&path, "too many events in one taxonomy")
        })?);
        self.events.push(EventDescriptor {
            id,
            path,
            name,
            description: node
                .get("description")
                .and_then(Value::as_str)
                .map(str::to_string),
            payload,
            server_to_client: flag("server_to_client"),
            client_to_server: flag("client_to_server"),
            internal,
        });
        Ok(id)
    }
}

fn conform(contract: &Validator, node: &Value, path: &str) -> Result<()> {
    contract
        .validate(node)
        .map_err(|mismatch| EventError::Structure {
            path: path.to_string(),
            mismatch,
        })
}

/// Keys become path segments, so they may not contain a separator.
fn check_key(parent: &str, key: &str) -> Result<()> {
    if key.trim().is_empty() || key.contains(['.', ':']) {
        return Err(EventError::definition(
            parent,
            format!("invalid child name \"{key}\", names may not be empty or contain '.' or ':'"),
        ));
    }
    Ok(())
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{PATH_SEPARATOR}{name}")
    }
}

fn normalize_path(path: &str) -> String {
    path.trim()
        .to_lowercase()
        .split([':', '.'])
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(PATH_SEPARATOR)
}
