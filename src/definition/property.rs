//! Property schemas for inputs and outputs.

use crate::error::{PromptyError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field names that mark a mapping as a property schema rather than a sample value.
const PROPERTY_FIELDS: [&str; 5] = ["type", "default", "sample", "sanitize", "description"];

/// JSON-shaped type of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Array,
    Object,
    Boolean,
}

impl PropertyType {
    /// Infer the type of a runtime value. `null` has no type.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::String(_) => Some(Self::String),
            Value::Number(_) => Some(Self::Number),
            Value::Array(_) => Some(Self::Array),
            Value::Object(_) => Some(Self::Object),
            Value::Bool(_) => Some(Self::Boolean),
            Value::Null => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Array => "array",
            Self::Object => "object",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type name of a runtime value for error messages, including `null`.
pub fn type_name(value: &Value) -> &'static str {
    PropertyType::of(value).map_or("null", |kind| kind.as_str())
}

/// Typed description of a single input or output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySettings {
    /// Declared (or inferred) type. `None` accepts any non-null value.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample: Option<Value>,

    /// Whether renderers should sanitize this value before substitution.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub sanitize: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl PropertySettings {
    /// A schema inferred from a bare sample value.
    pub fn from_sample(name: &str, sample: Value) -> Result<Self> {
        let kind = infer_type(name, &sample)?;
        Ok(Self {
            kind: Some(kind),
            sample: Some(sample),
            ..Self::default()
        })
    }

    /// Check `actual` against the declared type, adopting it if none is declared.
    pub(crate) fn unify(&mut self, name: &str, actual: PropertyType) -> Result<()> {
        match self.kind {
            None => {
                self.kind = Some(actual);
                Ok(())
            }
            Some(expected) if expected != actual => Err(PromptyError::TypeMismatch {
                name: name.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }
}

fn infer_type(name: &str, value: &Value) -> Result<PropertyType> {
    PropertyType::of(value).ok_or_else(|| PromptyError::InvalidType {
        name: name.to_string(),
        actual: type_name(value).to_string(),
    })
}

/// Load one `inputs` / `outputs` entry.
///
/// A mapping that uses any property field name is a schema (unknown fields are
/// rejected); anything else is a sample value whose type is inferred.
pub fn load_property(name: &str, value: &Value) -> Result<PropertySettings> {
    let is_schema = value
        .as_object()
        .is_some_and(|map| map.keys().any(|key| PROPERTY_FIELDS.contains(&key.as_str())));

    if !is_schema {
        return PropertySettings::from_sample(name, value.clone());
    }

    let mut property: PropertySettings = serde_json::from_value(value.clone())
        .map_err(|e| PromptyError::definition(format!("property '{}'", name), e))?;

    let examples: Vec<Value> = [&property.sample, &property.default]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
    for example in &examples {
        property.unify(name, infer_type(name, example)?)?;
    }

    Ok(property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_types_from_samples() {
        let cases = [
            (json!("text"), PropertyType::String),
            (json!(true), PropertyType::Boolean),
            (json!(3), PropertyType::Number),
            (json!(2.5), PropertyType::Number),
            (json!([1, 2]), PropertyType::Array),
            (json!({"nested": 1}), PropertyType::Object),
        ];
        for (value, expected) in cases {
            let property = load_property("p", &value).unwrap();
            assert_eq!(property.kind, Some(expected));
            assert_eq!(property.sample, Some(value));
        }
    }

    #[test]
    fn test_null_sample_is_invalid_type() {
        let err = load_property("p", &json!(null)).unwrap_err();
        assert!(matches!(err, PromptyError::InvalidType { name, .. } if name == "p"));
    }

    #[test]
    fn test_mapping_without_schema_fields_is_a_sample() {
        let property = load_property("p", &json!({"city": "Paris"})).unwrap();
        assert_eq!(property.kind, Some(PropertyType::Object));
        assert_eq!(property.sample, Some(json!({"city": "Paris"})));
    }

    #[test]
    fn test_schema_mapping() {
        let property = load_property(
            "question",
            &json!({"type": "string", "default": "hi", "description": "asked", "sanitize": true}),
        )
        .unwrap();
        assert_eq!(property.kind, Some(PropertyType::String));
        assert_eq!(property.default, Some(json!("hi")));
        assert_eq!(property.description, "asked");
        assert!(property.sanitize);
    }

    #[test]
    fn test_schema_type_inferred_from_sample_then_default() {
        let property = load_property("n", &json!({"sample": 4})).unwrap();
        assert_eq!(property.kind, Some(PropertyType::Number));

        let property = load_property("n", &json!({"default": [1]})).unwrap();
        assert_eq!(property.kind, Some(PropertyType::Array));
    }

    #[test]
    fn test_schema_rejects_unknown_fields() {
        let err = load_property("p", &json!({"type": "string", "colour": "red"})).unwrap_err();
        assert!(matches!(err, PromptyError::Definition { .. }));
        assert!(err.to_string().contains("colour"));
    }

    #[test]
    fn test_schema_rejects_unknown_type() {
        let err = load_property("p", &json!({"type": "integer"})).unwrap_err();
        assert!(matches!(err, PromptyError::Definition { .. }));
    }

    #[test]
    fn test_declared_type_must_match_sample_and_default() {
        let err = load_property("p", &json!({"type": "string", "sample": 1})).unwrap_err();
        assert!(matches!(
            err,
            PromptyError::TypeMismatch { ref expected, ref actual, .. }
                if expected == "string" && actual == "number"
        ));

        let err = load_property("p", &json!({"type": "boolean", "default": "no"})).unwrap_err();
        assert!(matches!(err, PromptyError::TypeMismatch { .. }));

        let err = load_property("p", &json!({"sample": "a", "default": 2})).unwrap_err();
        assert!(matches!(err, PromptyError::TypeMismatch { .. }));
    }

    #[test]
    fn test_null_default_is_no_default() {
        let property = load_property("p", &json!({"type": "string", "default": null})).unwrap();
        assert_eq!(property.default, None);
    }
}
