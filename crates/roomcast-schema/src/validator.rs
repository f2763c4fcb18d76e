use std::fmt;

use serde_json::Value;

use crate::config::ValidatorConfig;
use crate::error::{Result, SchemaError};
use crate::node::{NodeKind, NumberRule, SchemaNode, StringRule};

/// The first place where a document departs from its structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Dotted location of the offending node, starting at `root`.
    pub path: String,
    pub reason: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "the node \"{}\" {}", self.path, self.reason)
    }
}

impl std::error::Error for Mismatch {}

type Checked = std::result::Result<(), Mismatch>;

/// A parsed structure document ready to check documents against.
#[derive(Debug, Clone)]
pub struct Validator {
    root: SchemaNode,
    config: ValidatorConfig,
}

impl Validator {
    /// Wrap an already parsed structure with default config.
    pub fn new(root: SchemaNode) -> Self {
        Self::with_config(root, ValidatorConfig::default())
    }

    /// Wrap an already parsed structure with explicit config.
    pub fn with_config(root: SchemaNode, config: ValidatorConfig) -> Self {
        Self { root, config }
    }

    /// Parse a structure document from JSON value.
    pub fn from_value(contract: &Value) -> Result<Self> {
        Ok(Self::new(SchemaNode::from_value(contract)?))
    }

    /// Parse a structure document from a JSON string.
    pub fn from_json_str(contract: &str) -> Result<Self> {
        Ok(Self::new(SchemaNode::from_json_str(contract)?))
    }

    /// Check a document, returning the first mismatch.
    pub fn validate(&self, document: &Value) -> std::result::Result<(), Mismatch> {
        self.explore(document, "root", &self.root)
    }

    /// Check a document, reporting `(ok, reason)`.
    pub fn check(&self, document: &Value) -> (bool, Option<String>) {
        match self.validate(document) {
            Ok(()) => (true, None),
            Err(mismatch) => (false, Some(mismatch.to_string())),
        }
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    fn explore(&self, node: &Value, path: &str, schema: &SchemaNode) -> Checked {
        match &schema.kind {
            NodeKind::Int(rule) => {
                let number = node.as_f64().ok_or_else(|| mismatch(path, "is not a number"))?;
                if number.fract() != 0.0 {
                    return Err(mismatch(path, "is not an integer"));
                }
                check_number(number, rule, path)
            }
            NodeKind::Float(rule) => {
                let number = node.as_f64().ok_or_else(|| mismatch(path, "is not a number"))?;
                check_number(number, rule, path)
            }
            NodeKind::String(rule) => {
                let text = node.as_str().ok_or_else(|| mismatch(path, "is not a string"))?;
                check_string(text, rule, path)
            }
            NodeKind::Boolean => match node {
                Value::Bool(_) => Ok(()),
                _ => Err(mismatch(path, "is not a boolean")),
            },
            NodeKind::Null => match node {
                Value::Null => Ok(()),
                _ => Err(mismatch(path, "is not null")),
            },
            NodeKind::Dict(fields) => {
                let map = node.as_object().ok_or_else(|| mismatch(path, "is not a dict"))?;
                for (key, field) in fields {
                    match map.get(key) {
                        Some(child) => self.explore(child, &format!("{path}.{key}"), field)?,
                        None if field.required => {
                            return Err(mismatch(
                                path,
                                format!("does not have the required key \"{key}\""),
                            ))
                        }
                        None => {}
                    }
                }
                if self.config.strict_mode {
                    if let Some(key) = map.keys().find(|key| !fields.contains_key(*key)) {
                        return Err(mismatch(
                            path,
                            format!("has the key \"{key}\" that is not in the structure"),
                        ));
                    }
                }
                Ok(())
            }
            NodeKind::UndefinedDict(template) => {
                let map = node.as_object().ok_or_else(|| mismatch(path, "is not a dict"))?;
                for (key, child) in map {
                    self.explore(child, &format!("{path}.{key}"), template)?;
                }
                Ok(())
            }
            NodeKind::List(template) => {
                let items = node.as_array().ok_or_else(|| mismatch(path, "is not a list"))?;
                for (index, child) in items.iter().enumerate() {
                    self.explore(child, &format!("{path}.{index}"), template)?;
                }
                Ok(())
            }
        }
    }
}

/// Parse `schema` and check `document` against it in one go.
///
/// Structure errors come back as [`SchemaError::Contract`], mismatches as
/// [`SchemaError::ValidationFailed`].
pub fn validate(document: &Value, schema: &Value) -> Result<()> {
    Validator::from_value(schema)?
        .validate(document)
        .map_err(SchemaError::ValidationFailed)
}

fn check_number(number: f64, rule: &NumberRule, path: &str) -> Checked {
    if let Some(min) = rule.min {
        if number < min {
            return Err(mismatch(path, "is smaller than the minimum value"));
        }
    }
    if let Some(max) = rule.max {
        if number > max {
            return Err(mismatch(path, "is bigger than the maximum value"));
        }
    }
    if let Some(values) = &rule.values {
        if !values.contains(&number) {
            return Err(mismatch(path, "is not in the list of values"));
        }
    }
    Ok(())
}

fn check_string(text: &str, rule: &StringRule, path: &str) -> Checked {
    let len = text.chars().count();
    if let Some(min_length) = rule.min_length {
        if len < min_length {
            return Err(mismatch(path, "is smaller than the minimum length"));
        }
    }
    if let Some(max_length) = rule.max_length {
        if len > max_length {
            return Err(mismatch(path, "is bigger than the maximum length"));
        }
    }
    if let Some(values) = &rule.values {
        if !values.iter().any(|value| value == text) {
            return Err(mismatch(path, "is not in the list of values"));
        }
    }
    Ok(())
}

fn mismatch(path: &str, reason: impl Into<String>) -> Mismatch {
    Mismatch {
        path: path.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn validator(contract: Value) -> Validator {
        Validator::from_value(&contract).expect("contract should parse")
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        for tag in ["int", "float"] {
            let v = validator(json!({ "type": tag, "min": 1, "max": 10 }));
            assert!(v.validate(&json!(1)).is_ok());
            assert!(v.validate(&json!(5)).is_ok());
            assert!(v.validate(&json!(10)).is_ok());
            assert!(v.validate(&json!(0)).is_err());
            assert!(v.validate(&json!(11)).is_err());
        }
    }

    #[test]
    fn zero_bounds_are_enforced() {
        let v = validator(json!({ "type": "float", "min": 0 }));
        assert!(v.validate(&json!(0.0)).is_ok());
        assert!(v.validate(&json!(-0.5)).is_err());
    }

    #[test]
    fn int_rejects_fractions_and_non_numbers() {
        let v = validator(json!({ "type": "int" }));
        assert!(v.validate(&json!(3)).is_ok());
        assert!(v.validate(&json!(3.0)).is_ok());
        assert!(v.validate(&json!(3.5)).is_err());
        assert!(v.validate(&json!("3")).is_err());

        let v = validator(json!({ "type": "float" }));
        assert!(v.validate(&json!(3.5)).is_ok());
    }

    #[test]
    fn string_length_and_values() {
        let v = validator(json!({ "type": "string", "min_length": 2, "max_length": 4 }));
        assert!(v.validate(&json!("ab")).is_ok());
        assert!(v.validate(&json!("abcd")).is_ok());
        assert!(v.validate(&json!("a")).is_err());
        assert!(v.validate(&json!("abcde")).is_err());
        assert!(v.validate(&json!("été!")).is_ok());

        let v = validator(json!({ "type": "string", "values": ["GET", "POST"] }));
        assert!(v.validate(&json!("GET")).is_ok());
        assert!(v.validate(&json!("PUT")).is_err());
    }

    #[test]
    fn boolean_and_null() {
        let v = validator(json!({ "type": "boolean" }));
        assert!(v.validate(&json!(false)).is_ok());
        assert!(v.validate(&json!(0)).is_err());

        let v = validator(json!({ "type": "null" }));
        assert!(v.validate(&Value::Null).is_ok());
        assert!(v.validate(&json!({})).is_err());
    }

    #[test]
    fn dict_required_and_optional_fields() {
        let v = validator(json!({
            "type": "dict",
            "content": {
                "name": { "type": "string", "required": true },
                "port": { "type": "int", "required": false },
                "motd": { "type": "string" }
            }
        }));

        assert!(v.validate(&json!({ "name": "lobby" })).is_ok());
        assert!(v.validate(&json!({ "name": "lobby", "port": 80 })).is_ok());

        let err = v
            .validate(&json!({ "port": 80 }))
            .expect_err("missing required key should fail");
        assert_eq!(err.path, "root");
        assert!(err.reason.contains("\"name\""));

        let err = v
            .validate(&json!({ "name": "lobby", "port": "80" }))
            .expect_err("wrong field type should fail");
        assert_eq!(err.path, "root.port");
    }

    #[test]
    fn dict_is_open_by_default_and_closed_in_strict_mode() {
        let contract = json!({
            "type": "dict",
            "content": { "name": { "type": "string" } }
        });
        let doc = json!({ "name": "lobby", "extra": true });

        assert!(validator(contract.clone()).validate(&doc).is_ok());

        let strict = Validator::with_config(
            SchemaNode::from_value(&contract).expect("contract should parse"),
            ValidatorConfig {
                strict_mode: true,
                ..ValidatorConfig::default()
            },
        );
        let err = strict.validate(&doc).expect_err("strict mode should reject extra key");
        assert!(err.reason.contains("\"extra\""));
        assert!(strict.validate(&json!({ "name": "lobby" })).is_ok());
    }

    #[test]
    fn empty_collections_always_pass() {
        let list = validator(json!({
            "type": "list",
            "content_template": { "type": "int", "min": 100 }
        }));
        assert!(list.validate(&json!([])).is_ok());

        let map = validator(json!({
            "type": "undefined_dict",
            "content_template": { "type": "null" }
        }));
        assert!(map.validate(&json!({})).is_ok());
    }

    #[test]
    fn templates_apply_to_every_element() {
        let v = validator(json!({
            "type": "undefined_dict",
            "content_template": {
                "type": "list",
                "content_template": { "type": "string" }
            }
        }));

        assert!(v.validate(&json!({ "a": ["x"], "b": [] })).is_ok());
        let err = v
            .validate(&json!({ "a": ["x"], "b": ["y", 2] }))
            .expect_err("non-string element should fail");
        assert_eq!(err.path, "root.b.1");
        assert_eq!(err.to_string(), "the node \"root.b.1\" is not a string");
    }

    #[test]
    fn check_reports_pair() {
        let v = validator(json!({ "type": "list", "content_template": { "type": "boolean" } }));
        assert_eq!(v.check(&json!([true])), (true, None));

        let (ok, reason) = v.check(&json!({}));
        assert!(!ok);
        assert_eq!(reason.as_deref(), Some("the node \"root\" is not a list"));
    }

    #[test]
    fn one_shot_validate_separates_contract_and_mismatch() {
        assert!(matches!(
            validate(&json!(1), &json!({ "type": "integer" })),
            Err(SchemaError::Contract { .. })
        ));
        assert!(matches!(
            validate(&json!("1"), &json!({ "type": "int" })),
            Err(SchemaError::ValidationFailed(_))
        ));
        assert!(validate(&json!(1), &json!({ "type": "int" })).is_ok());
    }
}
