//! Building a [`Prompty`] from a raw attribute mapping.

use super::hoist::param_hoisting;
use super::model::{Content, ModelSettings, Prompty, TemplateSettings, Tool, new_id};
use super::property::{PropertySettings, PropertyType, load_property, type_name};
use crate::error::{PromptyError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Attributes left over once the structured blocks have been taken out.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Metadata {
    id: Option<String>,
    name: String,
    description: String,
    authors: BTreeSet<String>,
    tags: BTreeSet<String>,
    version: String,
    base: Option<String>,
}

impl Prompty {
    /// Build a definition from frontmatter attributes and a body.
    ///
    /// `attributes` should already be normalized. `global_config` is the
    /// connection profile used as the bottom layer of `model.configuration`.
    ///
    /// Two legacy forms are accepted with a warning: `template.type` (renamed
    /// to `template.format`) and a top-level `sample` mapping (folded into
    /// `inputs`).
    pub fn load_raw(
        mut attributes: Map<String, Value>,
        content: Content,
        file: PathBuf,
        global_config: &Map<String, Value>,
    ) -> Result<Self> {
        let model = load_model(attributes.remove("model"), global_config)?;
        let template = load_template(attributes.remove("template"))?;
        let mut inputs = load_properties("inputs", attributes.remove("inputs"))?;
        let outputs = load_properties("outputs", attributes.remove("outputs"))?;

        if let Some(sample) = attributes.remove("sample") {
            tracing::warn!(file = %file.display(), "`sample` is deprecated, use `inputs` instead");
            merge_legacy_sample(&mut inputs, sample)?;
        }

        let tools: Vec<Tool> = match attributes.remove("tools") {
            None | Some(Value::Null) => Vec::new(),
            Some(tools) => {
                serde_json::from_value(tools).map_err(|e| PromptyError::definition("tools", e))?
            }
        };

        let metadata: Metadata = serde_json::from_value(Value::Object(attributes))
            .map_err(|e| PromptyError::definition("metadata", e))?;

        Ok(Prompty {
            id: metadata.id.unwrap_or_else(new_id),
            name: metadata.name,
            description: metadata.description,
            authors: metadata.authors,
            tags: metadata.tags,
            version: metadata.version,
            base: metadata.base,
            base_prompty: None,
            model,
            inputs,
            outputs,
            tools,
            template,
            file,
            content,
        })
    }
}

/// Parse the `model` block, layering its configuration over the global one.
fn load_model(model: Option<Value>, global_config: &Map<String, Value>) -> Result<ModelSettings> {
    let mut model = match model {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(model)) => model,
        Some(other) => {
            return Err(PromptyError::definition(
                "model",
                format!("expected a mapping, found {}", type_name(&other)),
            ));
        }
    };

    let configuration = match model.remove("configuration") {
        None | Some(Value::Null) => Value::Object(global_config.clone()),
        Some(Value::Object(local)) => Value::Object(param_hoisting(&local, global_config)),
        // Left as-is so deserialization reports the shape error.
        Some(other) => other,
    };
    model.insert("configuration".to_string(), configuration);

    serde_json::from_value(Value::Object(model)).map_err(|e| PromptyError::definition("model", e))
}

/// Parse the `template` block.
fn load_template(template: Option<Value>) -> Result<TemplateSettings> {
    match template {
        None | Some(Value::Null) => Ok(TemplateSettings::default()),
        Some(Value::String(format)) => Ok(TemplateSettings::from_format(format)),
        Some(Value::Object(mut template)) => {
            if let Some(kind) = template.remove("type") {
                tracing::warn!("`template.type` is deprecated, use `template.format` instead");
                template.insert("format".to_string(), kind);
            }
            serde_json::from_value(Value::Object(template))
                .map_err(|e| PromptyError::definition("template", e))
        }
        Some(other) => Err(PromptyError::definition(
            "template",
            format!("expected a string or mapping, found {}", type_name(&other)),
        )),
    }
}

/// Parse an `inputs` / `outputs` block entry by entry.
fn load_properties(
    block: &str,
    properties: Option<Value>,
) -> Result<BTreeMap<String, PropertySettings>> {
    match properties {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(properties)) => properties
            .iter()
            .map(|(name, value)| Ok((name.clone(), load_property(name, value)?)))
            .collect(),
        Some(other) => Err(PromptyError::definition(
            block,
            format!("expected a mapping, found {}", type_name(&other)),
        )),
    }
}

/// Fold a legacy top-level `sample` mapping into the inputs.
fn merge_legacy_sample(
    inputs: &mut BTreeMap<String, PropertySettings>,
    sample: Value,
) -> Result<()> {
    let Value::Object(sample) = sample else {
        return Err(PromptyError::definition(
            "sample",
            format!("expected a mapping, found {}", type_name(&sample)),
        ));
    };

    for (name, value) in sample {
        let kind = PropertyType::of(&value).ok_or_else(|| PromptyError::InvalidType {
            name: name.clone(),
            actual: type_name(&value).to_string(),
        })?;

        let property = inputs.entry(name.clone()).or_default();
        property.unify(&name, kind)?;
        if property.sample.is_none() {
            property.sample = Some(value);
        }
    }

    Ok(())
}
