use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::{Result, SchemaError};

/// Bounds and enumeration for `int` / `float` nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberRule {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub values: Option<Vec<f64>>,
}

/// Length bounds and enumeration for `string` nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRule {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub values: Option<Vec<String>>,
}

/// Kind-specific part of a structure node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Int(NumberRule),
    Float(NumberRule),
    String(StringRule),
    Boolean,
    Null,
    Dict(BTreeMap<String, SchemaNode>),
    UndefinedDict(Box<SchemaNode>),
    List(Box<SchemaNode>),
}

impl NodeKind {
    /// The `type` tag this kind is written as in a structure document.
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Int(_) => "int",
            NodeKind::Float(_) => "float",
            NodeKind::String(_) => "string",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
            NodeKind::Dict(_) => "dict",
            NodeKind::UndefinedDict(_) => "undefined_dict",
            NodeKind::List(_) => "list",
        }
    }
}

/// One parsed node of a structure document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: NodeKind,
    /// Only meaningful for fields declared in a dict's `content`.
    pub required: bool,
}

impl SchemaNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Parse a structure document from its JSON text.
    pub fn from_json_str(contract: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contract)?;
        Self::from_value(&value)
    }

    /// Parse a structure document, rejecting any authoring error.
    pub fn from_value(contract: &Value) -> Result<Self> {
        parse_node(contract, "root")
    }
}

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode> {
    let map = value
        .as_object()
        .ok_or_else(|| SchemaError::contract(path, "structure node must be an object"))?;

    let tag = match map.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(_) => return Err(SchemaError::contract(path, "\"type\" must be a string")),
        None => return Err(SchemaError::contract(path, "missing \"type\"")),
    };

    let kind = match tag {
        "int" => NodeKind::Int(parse_number_rule(map, path)?),
        "float" => NodeKind::Float(parse_number_rule(map, path)?),
        "string" => NodeKind::String(parse_string_rule(map, path)?),
        "boolean" => NodeKind::Boolean,
        "null" => NodeKind::Null,
        "dict" => {
            let content = match map.get("content") {
                Some(Value::Object(content)) => content,
                Some(_) => return Err(SchemaError::contract(path, "\"content\" must be an object")),
                None => return Err(SchemaError::contract(path, "dict must have a content")),
            };
            let mut fields = BTreeMap::new();
            for (key, child) in content {
                let child_path = format!("{path}.{key}");
                fields.insert(key.clone(), parse_node(child, &child_path)?);
            }
            NodeKind::Dict(fields)
        }
        "undefined_dict" => NodeKind::UndefinedDict(Box::new(parse_template(map, path, tag)?)),
        "list" => NodeKind::List(Box::new(parse_template(map, path, tag)?)),
        other => {
            return Err(SchemaError::contract(
                path,
                format!("unknown type \"{other}\""),
            ))
        }
    };

    let required = match map.get("required") {
        None => false,
        Some(Value::Bool(required)) => *required,
        Some(_) => return Err(SchemaError::contract(path, "\"required\" must be a boolean")),
    };

    Ok(SchemaNode { kind, required })
}

fn parse_template(map: &Map<String, Value>, path: &str, tag: &str) -> Result<SchemaNode> {
    match map.get("content_template") {
        Some(template) => parse_node(template, &format!("{path}.<template>")),
        None => Err(SchemaError::contract(
            path,
            format!("{tag} must have a content_template"),
        )),
    }
}

fn parse_number_rule(map: &Map<String, Value>, path: &str) -> Result<NumberRule> {
    let values = match map.get("values") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| {
                    item.as_f64().ok_or_else(|| {
                        SchemaError::contract(path, "\"values\" must only contain numbers")
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => return Err(SchemaError::contract(path, "\"values\" must be a list")),
    };

    let rule = NumberRule {
        min: number_field(map, "min", path)?,
        max: number_field(map, "max", path)?,
        values,
    };

    if let (Some(min), Some(max)) = (rule.min, rule.max) {
        if min > max {
            return Err(SchemaError::contract(path, "\"min\" is greater than \"max\""));
        }
    }
    Ok(rule)
}

fn parse_string_rule(map: &Map<String, Value>, path: &str) -> Result<StringRule> {
    let values = match map.get("values") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        SchemaError::contract(path, "\"values\" must only contain strings")
                    })
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        Some(_) => return Err(SchemaError::contract(path, "\"values\" must be a list")),
    };

    Ok(StringRule {
        min_length: length_field(map, "min_length", path)?,
        max_length: length_field(map, "max_length", path)?,
        values,
    })
}

fn number_field(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaError::contract(path, format!("\"{key}\" must be a number"))),
    }
}

fn length_field(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<usize>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|len| usize::try_from(len).ok())
            .map(Some)
            .ok_or_else(|| {
                SchemaError::contract(path, format!("\"{key}\" must be a non-negative integer"))
            }),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_nested_contract() {
        let node = SchemaNode::from_value(&json!({
            "type": "dict",
            "content": {
                "port": { "type": "int", "min": 1, "max": 65535, "required": true },
                "rooms": {
                    "type": "list",
                    "content_template": { "type": "string", "max_length": 32 }
                }
            }
        }))
        .expect("contract should parse");

        let NodeKind::Dict(fields) = &node.kind else {
            panic!("expected dict, got {}", node.kind.tag());
        };
        assert!(fields["port"].required);
        assert!(!fields["rooms"].required);
        assert_eq!(
            fields["port"].kind,
            NodeKind::Int(NumberRule {
                min: Some(1.0),
                max: Some(65535.0),
                values: None
            })
        );
        assert!(matches!(fields["rooms"].kind, NodeKind::List(_)));
    }

    #[test]
    fn dict_without_content_is_a_contract_error() {
        let err = SchemaNode::from_value(&json!({ "type": "dict" }))
            .expect_err("dict without content should fail");
        assert!(matches!(err, SchemaError::Contract { .. }));
    }

    #[test]
    fn list_and_undefined_dict_need_a_template() {
        for tag in ["list", "undefined_dict"] {
            let err = SchemaNode::from_value(&json!({ "type": tag }))
                .expect_err("missing template should fail");
            assert!(err.to_string().contains("content_template"), "{err}");
        }
    }

    #[test]
    fn unknown_type_reports_its_path() {
        let err = SchemaNode::from_value(&json!({
            "type": "dict",
            "content": { "nested": { "type": "tuple" } }
        }))
        .expect_err("unknown type should fail");

        match err {
            SchemaError::Contract { path, message } => {
                assert_eq!(path, "root.nested");
                assert!(message.contains("tuple"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_malformed_constraints() {
        assert!(SchemaNode::from_value(&json!({ "type": "int", "min": "1" })).is_err());
        assert!(SchemaNode::from_value(&json!({ "type": "int", "min": 5, "max": 1 })).is_err());
        assert!(SchemaNode::from_value(&json!({ "type": "string", "max_length": -1 })).is_err());
        assert!(SchemaNode::from_value(&json!({ "type": "string", "values": [1] })).is_err());
        assert!(SchemaNode::from_value(&json!({ "type": "boolean", "required": "yes" })).is_err());
        assert!(SchemaNode::from_value(&json!("int")).is_err());
    }
}
