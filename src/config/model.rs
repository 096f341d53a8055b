//! GlobalConfig struct definition.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// File name searched for when resolving global configuration.
pub const CONFIG_FILE_NAME: &str = "prompty.json";

/// Connection profile used when none is named.
pub const DEFAULT_CONNECTION: &str = "default";

/// Contents of a `prompty.json` file: connection profiles keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct GlobalConfig {
    pub connections: BTreeMap<String, Value>,
}

impl GlobalConfig {
    /// The named connection profile, or an empty mapping if it is not defined.
    pub fn connection(&self, name: &str) -> Map<String, Value> {
        self.connections
            .get(name)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}
