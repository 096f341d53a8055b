//! Input validation against a definition's declared inputs.

use crate::definition::{Prompty, PropertyType, param_hoisting, type_name};
use crate::error::{PromptyError, Result};
use serde_json::{Map, Value};

/// Check `inputs` against the definition's declared inputs.
///
/// Returns one value per declared input, in declaration order:
/// - a supplied value must have the declared type (`null` never matches);
///   an input declared without a type accepts any non-null value
/// - a missing value falls back to the declared `default`, else fails with
///   [`PromptyError::MissingInput`]
///
/// Undeclared keys are dropped. With `merge_sample`, sample values fill any
/// gaps in `inputs` before the checks run.
pub fn validate_inputs(
    prompty: &Prompty,
    inputs: &Map<String, Value>,
    merge_sample: bool,
) -> Result<Map<String, Value>> {
    let merged;
    let inputs = if merge_sample {
        merged = param_hoisting(inputs, &prompty.sample());
        &merged
    } else {
        inputs
    };

    let mut values = Map::new();
    for (name, property) in &prompty.inputs {
        let value = match inputs.get(name) {
            Some(value) => {
                check_type(name, property.kind, value)?;
                value.clone()
            }
            None => property
                .default
                .clone()
                .ok_or_else(|| PromptyError::MissingInput(name.clone()))?,
        };
        values.insert(name.clone(), value);
    }

    Ok(values)
}

fn check_type(name: &str, declared: Option<PropertyType>, value: &Value) -> Result<()> {
    let actual = PropertyType::of(value);
    let matches = match (declared, actual) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(declared), Some(actual)) => declared == actual,
    };

    if matches {
        Ok(())
    } else {
        Err(PromptyError::TypeMismatch {
            name: name.to_string(),
            expected: declared.map_or("any", |kind| kind.as_str()).to_string(),
            actual: type_name(value).to_string(),
        })
    }
}
