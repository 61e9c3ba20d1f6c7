use crate::rates::CompareItem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Link between two blocks (by tag) carried in a block's `events` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventModel {
    pub source: String,
    pub target: String,
    pub input: String,
    pub output: String,
    pub actor: String,
    #[serde(default)]
    pub disabled: bool,
}

impl EventModel {
    pub fn from_json(event: &Map<String, Value>) -> Self {
        let text = |name: &str| {
            event
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            source: text("source"),
            target: text("target"),
            input: text("input"),
            output: text("output"),
            actor: text("actor"),
            disabled: event
                .get("disabled")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }

    /// Parse a block's `events` value; non-object entries are skipped
    pub fn list_from_json(events: Option<&Value>) -> Vec<EventModel> {
        events
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(Self::from_json)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The compared fields, in a fixed order
    pub fn fields(&self) -> [(&'static str, &str); 5] {
        [
            ("source", self.source.as_str()),
            ("target", self.target.as_str()),
            ("input", self.input.as_str()),
            ("output", self.output.as_str()),
            ("actor", self.actor.as_str()),
        ]
    }

    /// Number of compared fields that match
    pub fn equal_fields(&self, other: &EventModel) -> usize {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .filter(|(a, b)| a.1 == b.1)
            .count()
    }

    pub fn hash_part(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.source, self.output, self.target, self.input, self.actor
        )
    }
}

impl CompareItem for EventModel {
    fn key(&self) -> String {
        format!("{}:{}->{}:{}", self.source, self.output, self.target, self.input)
    }

    fn to_object(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
