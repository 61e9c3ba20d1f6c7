use super::property::PropertyModel;
use crate::hash::{HashBuilder, WeightTree};
use crate::options::CompareOptions;
use crate::rates::CompareItem;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Kind of a flat policy/tool collection entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Role,
    Group,
    Topic,
    Token,
    Variable,
    InputEvent,
    OutputEvent,
}

impl ObjectKind {
    /// Field holding the identity of an entry of this kind
    fn key_field(self) -> &'static str {
        match self {
            Self::Token => "templateTokenTag",
            _ => "name",
        }
    }
}

/// Entry of a flat collection (roles, groups, topics, tokens, variables, events)
#[derive(Debug, Clone)]
pub struct ObjectModel {
    pub kind: ObjectKind,
    pub key: String,
    pub index: usize,
    pub properties: Vec<PropertyModel>,
    weight: String,
}

impl ObjectModel {
    pub fn new(kind: ObjectKind, key: impl Into<String>, index: usize, properties: Vec<PropertyModel>) -> Self {
        Self {
            kind,
            key: key.into(),
            index,
            properties,
            weight: String::new(),
        }
    }

    /// Build from one raw entry; plain strings (roles) become a single `name` property
    pub fn from_json(kind: ObjectKind, index: usize, value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                let key = Self::key_from(kind, map, index);
                Self::new(kind, key, index, PropertyModel::flatten(map))
            }
            Value::String(name) => Self::new(
                kind,
                name.clone(),
                index,
                vec![PropertyModel::simple("name", value.clone())],
            ),
            other => Self::new(
                kind,
                other.to_string(),
                index,
                vec![PropertyModel::simple("value", other.clone())],
            ),
        }
    }

    pub fn list_from_json(kind: ObjectKind, value: Option<&Value>) -> Vec<ObjectModel> {
        value
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| Self::from_json(kind, index, item))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn key_from(kind: ObjectKind, map: &Map<String, Value>, index: usize) -> String {
        map.get(kind.key_field())
            .or_else(|| map.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string())
    }

    pub fn weight(&self) -> &str {
        &self.weight
    }

    pub fn update(&mut self, options: &CompareOptions) {
        let mut hash = HashBuilder::new();
        hash.add(&self.key);
        for prop in &self.properties {
            if let Some(part) = prop.hash(options) {
                hash.add(part);
            }
        }
        self.weight = hash.result();
    }

    pub fn to_weight(&self) -> WeightTree {
        WeightTree::leaf(self.weight.as_str())
    }
}

impl CompareItem for ObjectModel {
    fn key(&self) -> String {
        self.key.clone()
    }

    fn to_object(&self) -> Value {
        json!({
            "index": self.index,
            "name": self.key,
            "type": self.kind,
            "properties": self.properties.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
        })
    }
}
