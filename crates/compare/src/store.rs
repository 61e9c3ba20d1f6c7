//! Read-only seam to the document store.
//!
//! Comparators load their inputs only through [`DocumentStore`]. Records are
//! plain JSON; a missing record is `Ok(None)` and transport failures are
//! reported with `anyhow`.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;

/// Entity whose artifacts are requested
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArtifactOwner {
    Policy(String),
    Tool(String),
    Module(String),
}

impl ArtifactOwner {
    /// Metadata field naming the owner
    pub fn field(&self) -> &'static str {
        match self {
            Self::Policy(_) => "policyId",
            Self::Tool(_) => "toolId",
            Self::Module(_) => "moduleId",
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Policy(id) | Self::Tool(id) | Self::Module(id) => id,
        }
    }

    /// Whether artifact metadata belongs to this owner
    pub fn owns(&self, meta: &Value) -> bool {
        meta.get(self.field()).and_then(Value::as_str) == Some(self.id())
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get_policy(&self, id: &str) -> anyhow::Result<Option<Value>>;

    async fn get_tool_by_id(&self, id: &str) -> anyhow::Result<Option<Value>>;

    async fn get_module_by_id(&self, id: &str) -> anyhow::Result<Option<Value>>;

    async fn get_schema_by_id(&self, id: &str) -> anyhow::Result<Option<Value>>;

    /// Schemas published in a topic
    async fn get_schemas(&self, topic_id: &str) -> anyhow::Result<Vec<Value>>;

    /// Artifact metadata of one owner
    async fn get_artifacts(&self, owner: &ArtifactOwner) -> anyhow::Result<Vec<Value>>;

    async fn get_artifact_file_by_uuid(&self, uuid: &str) -> anyhow::Result<Option<Vec<u8>>>;

    async fn get_document_by_id(&self, id: &str) -> anyhow::Result<Option<Value>>;

    async fn get_record_by_id(&self, id: &str) -> anyhow::Result<Option<Value>>;
}

/// In-memory store keyed by record `id` (or `_id`)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    policies: HashMap<String, Value>,
    tools: HashMap<String, Value>,
    modules: HashMap<String, Value>,
    schemas: Vec<Value>,
    artifacts: Vec<Value>,
    files: HashMap<String, Vec<u8>>,
    documents: HashMap<String, Value>,
    records: HashMap<String, Value>,
}

fn record_id(record: &Value) -> String {
    record
        .get("id")
        .or_else(|| record.get("_id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_policy(&mut self, record: Value) -> &mut Self {
        self.policies.insert(record_id(&record), record);
        self
    }

    pub fn add_tool(&mut self, record: Value) -> &mut Self {
        self.tools.insert(record_id(&record), record);
        self
    }

    pub fn add_module(&mut self, record: Value) -> &mut Self {
        self.modules.insert(record_id(&record), record);
        self
    }

    pub fn add_schema(&mut self, record: Value) -> &mut Self {
        self.schemas.push(record);
        self
    }

    /// Artifact metadata plus its bytes
    pub fn add_artifact(&mut self, meta: Value, data: impl Into<Vec<u8>>) -> &mut Self {
        if let Some(uuid) = meta.get("uuid").and_then(Value::as_str) {
            self.files.insert(uuid.to_string(), data.into());
        }
        self.artifacts.push(meta);
        self
    }

    /// Artifact metadata whose file is missing
    pub fn add_artifact_meta(&mut self, meta: Value) -> &mut Self {
        self.artifacts.push(meta);
        self
    }

    pub fn add_document(&mut self, record: Value) -> &mut Self {
        self.documents.insert(record_id(&record), record);
        self
    }

    pub fn add_record(&mut self, record: Value) -> &mut Self {
        self.records.insert(record_id(&record), record);
        self
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_policy(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.policies.get(id).cloned())
    }

    async fn get_tool_by_id(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.tools.get(id).cloned())
    }

    async fn get_module_by_id(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.modules.get(id).cloned())
    }

    async fn get_schema_by_id(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.schemas.iter().find(|s| record_id(s) == id).cloned())
    }

    async fn get_schemas(&self, topic_id: &str) -> anyhow::Result<Vec<Value>> {
        Ok(self
            .schemas
            .iter()
            .filter(|s| s.get("topicId").and_then(Value::as_str) == Some(topic_id))
            .cloned()
            .collect())
    }

    async fn get_artifacts(&self, owner: &ArtifactOwner) -> anyhow::Result<Vec<Value>> {
        Ok(self
            .artifacts
            .iter()
            .filter(|a| owner.owns(a))
            .cloned()
            .collect())
    }

    async fn get_artifact_file_by_uuid(&self, uuid: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.files.get(uuid).cloned())
    }

    async fn get_document_by_id(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.documents.get(id).cloned())
    }

    async fn get_record_by_id(&self, id: &str) -> anyhow::Result<Option<Value>> {
        Ok(self.records.get(id).cloned())
    }
}
