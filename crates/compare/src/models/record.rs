use super::document::{DocumentKind, DocumentModel};
use super::schema::SchemaModel;
use crate::error::Result;
use crate::options::CompareOptions;
use crate::rates::CompareItem;
use crate::result::ModelInfo;
use serde_json::{json, Value};

/// Ordered list of documents produced by one policy run
#[derive(Debug, Clone)]
pub struct RecordModel {
    pub id: Option<String>,
    pub documents: Vec<DocumentModel>,
    pub schemas: Vec<SchemaModel>,
}

impl RecordModel {
    /// Build from `{ id, documents: [{ type: vc|vp|schema, document }] }`.
    /// Entries of unknown type are skipped.
    pub fn from_json(record: &Value, options: &CompareOptions) -> Result<Self> {
        let mut documents = Vec::new();
        let mut schemas = Vec::new();
        for entry in record
            .get("documents")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let body = entry.get("document").unwrap_or(&Value::Null);
            match entry.get("type").and_then(Value::as_str) {
                Some("vc") => documents.push(DocumentModel::with_kind(DocumentKind::Vc, body)),
                Some("vp") => documents.push(DocumentModel::with_kind(DocumentKind::Vp, body)),
                Some("schema") => schemas.push(SchemaModel::from_json(body, options)?),
                other => log::debug!("Skipping record entry of type {other:?}"),
            }
        }
        for doc in &mut documents {
            doc.set_schemas(schemas.clone());
        }
        Ok(Self {
            id: record.get("id").and_then(Value::as_str).map(str::to_string),
            documents,
            schemas,
        })
    }

    pub fn update(&mut self, options: &CompareOptions) -> &mut Self {
        for doc in &mut self.documents {
            doc.update(options);
        }
        self
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            id: self.id.clone(),
            kind: Some("record".to_string()),
            ..Default::default()
        }
    }
}

impl CompareItem for RecordModel {
    fn key(&self) -> String {
        self.id.clone().unwrap_or_default()
    }

    fn to_object(&self) -> Value {
        json!({
            "id": self.id,
            "documents": self.documents.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_entries() {
        let record = json!({
            "id": "r1",
            "documents": [
                { "type": "schema", "document": { "iri": "#a", "name": "A", "document": { "properties": {} } } },
                { "type": "vc", "document": { "schema": "#a", "document": { "credentialSubject": [{ "x": 1 }] } } },
                { "type": "vp", "document": { "type": "mint", "document": {} } },
                { "type": "unknown", "document": {} }
            ]
        });
        let model = RecordModel::from_json(&record, &CompareOptions::default()).unwrap();
        assert_eq!(model.documents.len(), 2);
        assert_eq!(model.schemas.len(), 1);
        assert_eq!(model.documents[0].title(), "A");
        assert_eq!(model.documents[1].kind, DocumentKind::Vp);
    }
}
