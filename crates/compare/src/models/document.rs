use super::property::PropertyModel;
use super::schema::SchemaModel;
use crate::hash::HashBuilder;
use crate::options::{ChildrenLvl, CompareOptions};
use crate::rates::CompareItem;
use crate::result::ModelInfo;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "VC")]
    Vc,
    #[serde(rename = "VP")]
    Vp,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vc => "VC",
            Self::Vp => "VP",
        }
    }
}

/// Issued VC or VP document with its related documents as children
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub id: Option<String>,
    pub kind: DocumentKind,
    /// Schema (VC) or document type (VP)
    pub key: String,
    pub message_id: Option<String>,
    pub topic_id: Option<String>,
    pub owner: Option<String>,
    pub policy: Option<String>,
    /// Flattened document body
    pub fields: Vec<PropertyModel>,
    /// Flattened `option` block (status and similar)
    pub options: Vec<PropertyModel>,
    pub relationship_ids: Vec<String>,
    pub children: Vec<DocumentModel>,
    schemas: Vec<SchemaModel>,
    hash: String,
}

impl DocumentModel {
    /// Build from a stored document record; the kind is detected from the body
    pub fn from_json(record: &Value) -> Self {
        let body = record.get("document").unwrap_or(&Value::Null);
        let is_vp = body
            .get("type")
            .map(|t| match t {
                Value::Array(items) => items.iter().any(|i| i == "VerifiablePresentation"),
                other => other == "VerifiablePresentation",
            })
            .unwrap_or(false)
            || body.get("verifiableCredential").is_some();
        let kind = if is_vp { DocumentKind::Vp } else { DocumentKind::Vc };
        Self::with_kind(kind, record)
    }

    pub fn with_kind(kind: DocumentKind, record: &Value) -> Self {
        let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);
        let body = record.get("document").unwrap_or(&Value::Null);
        let subject_type = body
            .get("credentialSubject")
            .and_then(|s| s.get(0).or(Some(s)))
            .and_then(|s| s.get("type"))
            .and_then(Value::as_str);
        let key = match kind {
            DocumentKind::Vc => text("schema"),
            DocumentKind::Vp => text("type"),
        };
        Self {
            id: text("id").or_else(|| text("_id")),
            kind,
            key: key.unwrap_or_default(),
            message_id: text("messageId"),
            topic_id: text("topicId"),
            owner: text("owner"),
            policy: text("policyId"),
            fields: PropertyModel::document_properties(body, subject_type),
            options: record
                .get("option")
                .and_then(Value::as_object)
                .map(PropertyModel::flatten)
                .unwrap_or_default(),
            relationship_ids: record
                .get("relationships")
                .and_then(Value::as_array)
                .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
            children: Vec::new(),
            schemas: Vec::new(),
            hash: String::new(),
        }
    }

    pub fn set_relationships(&mut self, children: Vec<DocumentModel>) -> &mut Self {
        self.children = children;
        self
    }

    pub fn set_schemas(&mut self, schemas: Vec<SchemaModel>) -> &mut Self {
        self.schemas = schemas;
        self
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn update(&mut self, options: &CompareOptions) {
        for child in &mut self.children {
            child.update(options);
        }
        let mut hash = HashBuilder::new();
        hash.add(self.kind.as_str());
        for prop in &self.fields {
            if let Some(part) = prop.hash(options) {
                hash.add(part);
            }
        }
        if options.child_lvl != ChildrenLvl::None {
            for child in &self.children {
                hash.add(&child.hash);
            }
        }
        self.hash = hash.result();
    }

    /// Schema titles, or the key when no schema is known
    pub fn title(&self) -> String {
        let titles: Vec<String> = self
            .schemas
            .iter()
            .filter(|s| s.iri.as_deref() == Some(self.key.as_str()) || self.schemas.len() == 1)
            .map(SchemaModel::title)
            .filter(|t| !t.is_empty())
            .collect();
        if titles.is_empty() {
            self.key.clone()
        } else {
            titles.join(", ")
        }
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            id: self.id.clone(),
            kind: Some(self.kind.as_str().to_string()),
            owner: self.owner.clone(),
            policy: self.policy.clone(),
            message_id: self.message_id.clone(),
            ..Default::default()
        }
    }
}

impl CompareItem for DocumentModel {
    fn key(&self) -> String {
        self.key.clone()
    }

    fn to_object(&self) -> Value {
        json!({
            "key": self.key,
            "owner": self.owner,
            "policy": self.policy,
            "document": self.fields.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
            "options": self.options.iter().map(CompareItem::to_object).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_vc_record() {
        let record = json!({
            "id": "d1",
            "schema": "#project&1.0.0",
            "owner": "did:hedera:testnet:owner",
            "option": { "status": "NEW" },
            "relationships": ["d0"],
            "document": {
                "type": ["VerifiableCredential"],
                "credentialSubject": [{ "type": "project", "field0": "A" }]
            }
        });
        let doc = DocumentModel::from_json(&record);
        assert_eq!(doc.kind, DocumentKind::Vc);
        assert_eq!(doc.key, "#project&1.0.0");
        assert_eq!(doc.relationship_ids, vec!["d0".to_string()]);
        assert_eq!(doc.options[0].path, "status");
        assert!(doc.fields.iter().any(|p| p.path == "credentialSubject.0.field0"));
        assert_eq!(doc.title(), "#project&1.0.0");
    }

    #[test]
    fn test_vp_record() {
        let record = json!({
            "id": "v1",
            "type": "mint",
            "document": { "type": ["VerifiablePresentation"], "verifiableCredential": [] }
        });
        let doc = DocumentModel::from_json(&record);
        assert_eq!(doc.kind, DocumentKind::Vp);
        assert_eq!(doc.key, "mint");
        assert_eq!(doc.info().kind.as_deref(), Some("VP"));
    }

    #[test]
    fn test_hash_ignores_system_fields_without_ids() {
        let a = json!({ "document": { "id": "urn:1", "credentialSubject": [{ "x": 1 }] } });
        let b = json!({ "document": { "id": "urn:2", "credentialSubject": [{ "x": 1 }] } });
        let mut a = DocumentModel::from_json(&a);
        let mut b = DocumentModel::from_json(&b);
        a.update(&CompareOptions::hashing());
        b.update(&CompareOptions::hashing());
        assert_eq!(a.hash(), b.hash());
        a.update(&CompareOptions::default());
        b.update(&CompareOptions::default());
        assert_ne!(a.hash(), b.hash());
    }
}
