//! Definition types: the asset itself and the blocks it is made of.

use super::property::PropertySettings;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Model binding: which API to call and how.
///
/// `configuration` and `parameters` are opaque to this crate; they are only
/// merged (see [`param_hoisting`](super::param_hoisting)) and handed to plugins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSettings {
    /// Invocation kind (e.g. "chat", "completion", "embedding"); selects executor and processor.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub api: String,

    /// Connection settings (endpoint, deployment, credentials, ...).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub configuration: Map<String, Value>,

    /// Request parameters (temperature, max tokens, ...).
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub parameters: Map<String, Value>,

    /// Response shaping settings.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub response: Map<String, Value>,
}

/// Template settings: which renderer and parser handle the content body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateSettings {
    /// Renderer selector.
    #[serde(default = "default_mapping_format")]
    pub format: String,

    /// Parser selector.
    #[serde(default)]
    pub parser: String,

    /// Per-run nonce, stamped by `prepare`. Never serialized.
    #[serde(skip)]
    pub nonce: Option<String>,
}

/// Format used when a template mapping omits `format`.
fn default_mapping_format() -> String {
    "mustache".to_string()
}

impl TemplateSettings {
    /// Settings for a bare `template: <format>` string.
    pub fn from_format(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            parser: "prompty".to_string(),
            nonce: None,
        }
    }
}

/// Settings used when a definition has no `template` block at all.
impl Default for TemplateSettings {
    fn default() -> Self {
        Self::from_format("jinja2")
    }
}

/// A parameter accepted by a declared tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// A tool the model may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub configuration: Map<String, Value>,
    /// Declared parameters, in order.
    #[serde(default)]
    pub parameters: Vec<ToolParameter>,
}

/// The unparsed body of a definition.
///
/// Resolution never touches it; only the render stage interprets it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Lines(Vec<String>),
    Structured(Map<String, Value>),
}

impl Content {
    pub fn is_empty(&self) -> bool {
        match self {
            Content::Text(text) => text.is_empty(),
            Content::Lines(lines) => lines.is_empty(),
            Content::Structured(map) => map.is_empty(),
        }
    }

    /// The content as a plain JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Content::Text(text) => Value::String(text.clone()),
            Content::Lines(lines) => {
                Value::Array(lines.iter().cloned().map(Value::String).collect())
            }
            Content::Structured(map) => Value::Object(map.clone()),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

/// A resolved prompt asset.
///
/// Serializes to its "safe" form: empty metadata is omitted and the resolved
/// base is never written out (only the `base` reference is).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prompty {
    // =========================================================================
    // Metadata
    // =========================================================================
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub authors: BTreeSet<String>,

    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Reference to the base definition, relative to this file's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,

    /// The fully resolved base, set by [`Prompty::hoist_base`].
    #[serde(skip)]
    pub base_prompty: Option<Box<Prompty>>,

    // =========================================================================
    // Model, schema, template
    // =========================================================================
    pub model: ModelSettings,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, PropertySettings>,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, PropertySettings>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,

    pub template: TemplateSettings,

    // =========================================================================
    // Source
    // =========================================================================
    #[serde(skip_serializing_if = "path_is_empty")]
    pub file: PathBuf,

    #[serde(skip_serializing_if = "Content::is_empty")]
    pub content: Content,
}

fn path_is_empty(path: &Path) -> bool {
    path.as_os_str().is_empty()
}

/// Fresh random identifier (hex, no dashes).
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

impl Default for Prompty {
    fn default() -> Self {
        Self {
            id: new_id(),
            name: String::new(),
            description: String::new(),
            authors: BTreeSet::new(),
            tags: BTreeSet::new(),
            version: String::new(),
            base: None,
            base_prompty: None,
            model: ModelSettings::default(),
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            tools: Vec::new(),
            template: TemplateSettings::default(),
            file: PathBuf::new(),
            content: Content::default(),
        }
    }
}

impl Prompty {
    /// Sample input values: each input's `sample`, else its `default`.
    pub fn sample(&self) -> Map<String, Value> {
        self.inputs
            .iter()
            .filter_map(|(name, property)| {
                property
                    .sample
                    .as_ref()
                    .or(property.default.as_ref())
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// The definition in its serialized "safe" form.
    pub fn to_safe_value(&self) -> Value {
        // Every field serializes to plain JSON; this cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
