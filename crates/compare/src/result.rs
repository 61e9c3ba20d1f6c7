use crate::report::ReportTable;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a compared model as shown in report headers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
}

impl ModelInfo {
    /// Read the common identity fields of a store record
    pub fn from_record(record: &Value) -> Self {
        let text = |key: &str| match record.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self {
            id: text("id").or_else(|| text("_id")),
            uuid: text("uuid"),
            iri: text("iri"),
            name: text("name"),
            description: text("description"),
            version: text("version"),
            hash: text("hash"),
            message_id: text("messageId"),
            topic_id: text("topicId"),
            owner: text("owner"),
            kind: None,
            policy: text("policyId"),
        }
    }

    /// Field used in CSV identity rows; missing values render empty
    pub fn field(&self, name: &str) -> &str {
        let value = match name {
            "id" => &self.id,
            "uuid" => &self.uuid,
            "iri" => &self.iri,
            "name" => &self.name,
            "description" => &self.description,
            "version" => &self.version,
            "hash" => &self.hash,
            "messageId" => &self.message_id,
            "topicId" => &self.topic_id,
            "owner" => &self.owner,
            "type" => &self.kind,
            "policy" => &self.policy,
            _ => return "",
        };
        value.as_deref().unwrap_or_default()
    }
}

/// Result of one left-vs-right comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResult {
    pub left: ModelInfo,
    pub right: ModelInfo,
    pub total: u32,
    /// Named report tables (`blocks`, `roles`, `fields`, ...)
    #[serde(flatten)]
    pub tables: IndexMap<String, ReportTable>,
}

impl CompareResult {
    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.get(name)
    }
}

/// N-way comparison: one fixed left against every right
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCompareResult {
    /// Number of compared models (rights + 1)
    pub size: usize,
    pub left: ModelInfo,
    pub rights: Vec<ModelInfo>,
    pub totals: Vec<u32>,
    #[serde(flatten)]
    pub tables: IndexMap<String, ReportTable>,
}

impl MultiCompareResult {
    pub fn table(&self, name: &str) -> Option<&ReportTable> {
        self.tables.get(name)
    }
}
