//! Directory-backed [`DocumentStore`].
//!
//! ```text
//! <root>/policies/<id>.json
//! <root>/tools/<id>.json
//! <root>/modules/<id>.json
//! <root>/schemas/<id>.json
//! <root>/documents/<id>.json
//! <root>/records/<id>.json
//! <root>/artifacts/<id>.json        metadata with policyId / toolId / moduleId
//! <root>/artifacts/files/<uuid>     bytes
//! ```

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use policy_compare::{ArtifactOwner, DocumentStore};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry(&self, dir: &str, id: &str, ext: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            bail!("Invalid record id {id:?}");
        }
        Ok(self.root.join(dir).join(format!("{id}{ext}")))
    }

    async fn read_bytes(path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    async fn read_json(path: &Path) -> Result<Option<Value>> {
        let Some(bytes) = Self::read_bytes(path).await? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?;
        Ok(Some(value))
    }

    async fn record(&self, dir: &str, id: &str) -> Result<Option<Value>> {
        let path = self.entry(dir, id, ".json")?;
        log::debug!("Reading {}", path.display());
        Self::read_json(&path).await
    }

    /// Every `*.json` record of a directory, in file name order
    async fn records(&self, dir: &str) -> Result<Vec<Value>> {
        let dir = self.root.join(dir);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err).with_context(|| format!("Failed to list {}", dir.display())),
        };
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut out = Vec::with_capacity(paths.len());
        for path in paths {
            if let Some(value) = Self::read_json(&path).await? {
                out.push(value);
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl DocumentStore for FsStore {
    async fn get_policy(&self, id: &str) -> Result<Option<Value>> {
        self.record("policies", id).await
    }

    async fn get_tool_by_id(&self, id: &str) -> Result<Option<Value>> {
        self.record("tools", id).await
    }

    async fn get_module_by_id(&self, id: &str) -> Result<Option<Value>> {
        self.record("modules", id).await
    }

    async fn get_schema_by_id(&self, id: &str) -> Result<Option<Value>> {
        self.record("schemas", id).await
    }

    async fn get_schemas(&self, topic_id: &str) -> Result<Vec<Value>> {
        let mut schemas = self.records("schemas").await?;
        schemas.retain(|s| s.get("topicId").and_then(Value::as_str) == Some(topic_id));
        Ok(schemas)
    }

    async fn get_artifacts(&self, owner: &ArtifactOwner) -> Result<Vec<Value>> {
        let mut artifacts = self.records("artifacts").await?;
        artifacts.retain(|meta| owner.owns(meta));
        Ok(artifacts)
    }

    async fn get_artifact_file_by_uuid(&self, uuid: &str) -> Result<Option<Vec<u8>>> {
        let path = self.entry("artifacts/files", uuid, "")?;
        Self::read_bytes(&path).await
    }

    async fn get_document_by_id(&self, id: &str) -> Result<Option<Value>> {
        self.record("documents", id).await
    }

    async fn get_record_by_id(&self, id: &str) -> Result<Option<Value>> {
        self.record("records", id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_reads_layout() {
        let temp = tempdir().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("policies")).unwrap();
        fs::create_dir_all(root.join("schemas")).unwrap();
        fs::create_dir_all(root.join("artifacts/files")).unwrap();
        fs::write(root.join("policies/p1.json"), r#"{"id":"p1"}"#).unwrap();
        fs::write(root.join("schemas/b.json"), r#"{"id":"b","topicId":"t"}"#).unwrap();
        fs::write(root.join("schemas/a.json"), r#"{"id":"a","topicId":"t"}"#).unwrap();
        fs::write(root.join("schemas/c.json"), r#"{"id":"c","topicId":"other"}"#).unwrap();
        fs::write(root.join("artifacts/x.json"), r#"{"uuid":"u1","policyId":"p1"}"#).unwrap();
        fs::write(root.join("artifacts/files/u1"), b"data").unwrap();

        let store = FsStore::new(root);
        assert_eq!(store.get_policy("p1").await.unwrap(), Some(json!({ "id": "p1" })));
        assert_eq!(store.get_policy("missing").await.unwrap(), None);
        let ids: Vec<Value> = store.get_schemas("t").await.unwrap().into_iter().map(|s| s["id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b")]);
        let owner = ArtifactOwner::Policy("p1".into());
        assert_eq!(store.get_artifacts(&owner).await.unwrap().len(), 1);
        assert_eq!(store.get_artifact_file_by_uuid("u1").await.unwrap(), Some(b"data".to_vec()));
        assert!(store.get_tool_by_id("../policies/p1").await.is_err());
    }
}
