//! Layered merging: configuration hoisting and base inheritance.

use super::model::Prompty;
use serde_json::{Map, Value};

/// Merge two mappings where `top` wins and `bottom` fills the gaps.
///
/// ```
/// use prompty::definition::param_hoisting;
/// use serde_json::json;
///
/// let top = json!({"x": 1}).as_object().cloned().unwrap();
/// let bottom = json!({"x": 2, "y": 3}).as_object().cloned().unwrap();
/// let merged = param_hoisting(&top, &bottom);
/// assert_eq!(serde_json::Value::Object(merged), json!({"x": 1, "y": 3}));
/// ```
pub fn param_hoisting(top: &Map<String, Value>, bottom: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = top.clone();
    for (key, value) in bottom {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

fn fall_back(top: &mut String, base: &str) {
    if top.is_empty() {
        *top = base.to_string();
    }
}

impl Prompty {
    /// Inherit from a fully resolved base definition.
    ///
    /// Empty scalar metadata and `model.api` fall back to the base, `authors`
    /// and `tags` become the union of both, and the model's `configuration`,
    /// `parameters` and `response` are hoisted over the base's. Tools are not
    /// inherited. The base is kept as `base_prompty`.
    pub fn hoist_base(mut self, base: Prompty) -> Prompty {
        fall_back(&mut self.name, &base.name);
        fall_back(&mut self.description, &base.description);
        fall_back(&mut self.version, &base.version);
        self.authors.extend(base.authors.iter().cloned());
        self.tags.extend(base.tags.iter().cloned());

        fall_back(&mut self.model.api, &base.model.api);
        self.model.configuration =
            param_hoisting(&self.model.configuration, &base.model.configuration);
        self.model.parameters = param_hoisting(&self.model.parameters, &base.model.parameters);
        self.model.response = param_hoisting(&self.model.response, &base.model.response);

        self.base_prompty = Some(Box::new(base));
        self
    }
}
