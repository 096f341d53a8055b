//! Trace event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single observability record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// When the event was recorded.
    pub ts: DateTime<Utc>,

    /// What happened (e.g. "render", "PromptyStream").
    pub name: String,

    /// Named facts about the event.
    pub facts: Map<String, Value>,
}

impl TraceEvent {
    /// Create an event stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            ts: Utc::now(),
            name: name.into(),
            facts: Map::new(),
        }
    }

    /// Attach a fact. Values that fail to serialize are recorded as null.
    pub fn with_fact(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        self.facts.insert(
            key.into(),
            serde_json::to_value(value).unwrap_or(Value::Null),
        );
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = TraceEvent::new("execute");

        assert_eq!(event.name, "execute");
        assert!(event.facts.is_empty());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_facts() {
        let event = TraceEvent::new("render")
            .with_fact("signature", "prompty.renderer.jinja2")
            .with_fact("inputs", json!({"name": "Jane"}))
            .with_fact("result", vec![1, 2, 3]);

        assert_eq!(event.facts["signature"], "prompty.renderer.jinja2");
        assert_eq!(event.facts["inputs"]["name"], "Jane");
        assert_eq!(event.facts["result"], json!([1, 2, 3]));
    }

    #[test]
    fn test_event_serialization_is_single_line() {
        let event = TraceEvent::new("process").with_fact("result", "multi\nline");

        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));

        let parsed: TraceEvent = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, event);
    }
}
