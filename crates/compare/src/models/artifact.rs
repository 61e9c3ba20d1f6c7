use crate::hash::sha256_hex;
use crate::rates::CompareItem;
use serde_json::{json, Value};

/// Artifact attached to a policy, tool or block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactModel {
    pub uuid: String,
    pub name: String,
    pub kind: String,
    pub extension: String,
    /// SHA-256 of the artifact bytes, once loaded
    pub hash: Option<String>,
}

impl ArtifactModel {
    /// Build from artifact metadata (`uuid`, `name`, `type`, `extention`)
    pub fn from_json(meta: &Value) -> Self {
        let text = |name: &str| {
            meta.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let extension = match text("extention") {
            ext if ext.is_empty() => text("extension"),
            ext => ext,
        };
        Self {
            uuid: text("uuid"),
            name: text("name"),
            kind: text("type"),
            extension,
            hash: None,
        }
    }

    pub fn list_from_json(artifacts: Option<&Value>) -> Vec<ArtifactModel> {
        artifacts
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Self::from_json).collect())
            .unwrap_or_default()
    }

    pub fn with_data(mut self, data: &[u8]) -> Self {
        self.hash = Some(sha256_hex(data));
        self
    }

    /// Byte-identical content. Without data on both sides, falls back to the
    /// uuid, or to all metadata when there is no uuid.
    pub fn same_content(&self, other: &ArtifactModel) -> bool {
        match (&self.hash, &other.hash) {
            (Some(a), Some(b)) => a == b,
            _ if !self.uuid.is_empty() || !other.uuid.is_empty() => self.uuid == other.uuid,
            _ => {
                self.name == other.name
                    && self.kind == other.kind
                    && self.extension == other.extension
            }
        }
    }

    pub fn hash_part(&self) -> String {
        self.hash.clone().unwrap_or_else(|| self.uuid.clone())
    }
}

impl CompareItem for ArtifactModel {
    fn key(&self) -> String {
        if self.name.is_empty() {
            self.uuid.clone()
        } else {
            self.name.clone()
        }
    }

    fn to_object(&self) -> Value {
        json!({
            "uuid": self.uuid,
            "name": self.name,
            "type": self.kind,
            "extention": self.extension,
            "hash": self.hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_content_by_bytes() {
        let a = ArtifactModel::from_json(&json!({"uuid": "1", "name": "calc.js"})).with_data(b"x = 1");
        let b = ArtifactModel::from_json(&json!({"uuid": "2", "name": "calc.js"})).with_data(b"x = 1");
        let c = ArtifactModel::from_json(&json!({"uuid": "3", "name": "calc.js"})).with_data(b"x = 2");
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_same_content_falls_back_to_uuid() {
        let a = ArtifactModel::from_json(&json!({"uuid": "1", "name": "f", "extention": "js"}));
        let b = ArtifactModel::from_json(&json!({"uuid": "1", "name": "f"}));
        let c = ArtifactModel::from_json(&json!({"uuid": "2", "name": "f"}));
        assert_eq!(a.extension, "js");
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_same_content_without_uuid_uses_metadata() {
        let a = ArtifactModel::from_json(&json!({"name": "calc.js", "type": "Executable Code"}));
        let b = ArtifactModel::from_json(&json!({"name": "calc.js", "type": "Executable Code"}));
        let c = ArtifactModel::from_json(&json!({"name": "other.js", "type": "Executable Code"}));
        assert!(a.same_content(&a));
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }
}
