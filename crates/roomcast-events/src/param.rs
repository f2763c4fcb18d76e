use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

/// Declared runtime type of one payload argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Int,
    Boolean,
    Object,
    Array,
    Null,
    Any,
}

impl ParamType {
    /// Every type name accepted in a definitions document.
    pub const NAMES: [&'static str; 8] = [
        "string", "number", "int", "boolean", "object", "array", "null", "any",
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Int => "int",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
            ParamType::Null => "null",
            ParamType::Any => "any",
        }
    }

    /// Returns true if `value` is acceptable for this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            // Same rule as the structure validator: integral floats count.
            ParamType::Int => {
                value.is_i64()
                    || value.is_u64()
                    || value.as_f64().is_some_and(|n| n.is_finite() && n.fract() == 0.0)
            }
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
            ParamType::Null => value.is_null(),
            ParamType::Any => true,
        }
    }

    /// Name of the JSON type of `value`, used in mismatch reports.
    pub fn describe(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(n) if n.is_f64() => "number",
            Value::Number(_) => "int",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(ParamType::String),
            "number" => Ok(ParamType::Number),
            "int" => Ok(ParamType::Int),
            "boolean" => Ok(ParamType::Boolean),
            "object" => Ok(ParamType::Object),
            "array" => Ok(ParamType::Array),
            "null" => Ok(ParamType::Null),
            "any" => Ok(ParamType::Any),
            other => Err(format!("unknown payload type \"{other}\"")),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for name in ParamType::NAMES {
            let parsed: ParamType = name.parse().expect("listed name should parse");
            assert_eq!(parsed.as_str(), name);
        }
        assert!("float".parse::<ParamType>().is_err());
    }

    #[test]
    fn number_accepts_integers_but_int_rejects_fractions() {
        assert!(ParamType::Number.matches(&json!(1)));
        assert!(ParamType::Number.matches(&json!(1.5)));
        assert!(ParamType::Int.matches(&json!(-3)));
        assert!(ParamType::Int.matches(&json!(3.0)));
        assert!(!ParamType::Int.matches(&json!(1.5)));
        assert!(!ParamType::Int.matches(&json!("3")));
        assert!(!ParamType::Number.matches(&json!("1")));
    }

    #[test]
    fn any_accepts_everything() {
        for value in [json!(null), json!([1]), json!({"a": 1}), json!("x")] {
            assert!(ParamType::Any.matches(&value));
        }
    }

    #[test]
    fn describe_names_json_types() {
        assert_eq!(ParamType::describe(&json!(2)), "int");
        assert_eq!(ParamType::describe(&json!(2.5)), "number");
        assert_eq!(ParamType::describe(&json!([])), "array");
        assert_eq!(ParamType::describe(&json!(null)), "null");
    }
}
