use super::columns::{rate_cell, sub_rate_items};
use super::{csv_report, load_schemas, merge_results, require, Comparator, IdentityColumns};
use crate::error::{CompareError, Result};
use crate::models::{DocumentModel, SchemaModel};
use crate::options::CompareOptions;
use crate::rates::{CompareItem, Rate, DOCUMENTS_RATE, OPTIONS_RATE, TOTAL_RATE};
use crate::report::{Column, ColumnType, ReportRow, ReportTable};
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::DocumentStore;
use crate::utils::{CellSource, ComparePolicyUtils, CompareUtils, MergeLayout};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

pub(super) const IDENTITY: IdentityColumns = &[
    ("Document ID", "id"),
    ("Document Type", "type"),
    ("Document Owner", "owner"),
    ("Policy", "policy"),
    ("Message", "messageId"),
];

pub(super) fn document_columns() -> Vec<Column> {
    vec![
        Column::new("lvl", "Offset", ColumnType::Number),
        Column::new("left_id", "ID", ColumnType::String),
        Column::new("left_message_id", "Message", ColumnType::String),
        Column::new("left_type", "Type", ColumnType::String),
        Column::new("left_schema", "Schema", ColumnType::String),
        Column::new("left_owner", "Owner", ColumnType::String),
        Column::new("right_id", "ID", ColumnType::String),
        Column::new("right_message_id", "Message", ColumnType::String),
        Column::new("right_type", "Type", ColumnType::String),
        Column::new("right_schema", "Schema", ColumnType::String),
        Column::new("right_owner", "Owner", ColumnType::String),
        Column::rate("document_rate", "Document Rate"),
        Column::rate("options_rate", "Options Rate"),
        Column::rate("total_rate", "Total Rate"),
        Column::data("type", ColumnType::String),
        Column::data("document_type", ColumnType::String),
        Column::data("document_schema", ColumnType::String),
        Column::data("left", ColumnType::Object),
        Column::data("right", ColumnType::Object),
        Column::data("documents", ColumnType::Object),
        Column::data("options", ColumnType::Object),
    ]
}

pub(super) fn document_layout() -> MergeLayout {
    let side = |prefix: &str| {
        vec![
            Column::new(format!("{prefix}_id"), "ID", ColumnType::String),
            Column::new(format!("{prefix}_message_id"), "Message", ColumnType::String),
            Column::new(format!("{prefix}_type"), "Type", ColumnType::String),
            Column::new(format!("{prefix}_schema"), "Schema", ColumnType::String),
            Column::new(format!("{prefix}_owner"), "Owner", ColumnType::String),
        ]
    };
    let mut head = vec![
        (Column::new("lvl", "Offset", ColumnType::Number), CellSource::Shared),
        (Column::data("document_type", ColumnType::String), CellSource::Shared),
        (Column::data("document_schema", ColumnType::String), CellSource::Shared),
        (Column::data("left", ColumnType::Object), CellSource::Left),
    ];
    head.extend(side("left").into_iter().map(|c| (c, CellSource::Left)));
    head.push((Column::data("documents", ColumnType::Object), CellSource::Rates));
    head.push((Column::data("options", ColumnType::Object), CellSource::Rates));

    let mut right = vec![
        Column::data("type", ColumnType::String),
        Column::data("right", ColumnType::Object),
    ];
    right.extend(side("right"));
    right.extend([
        Column::rate("document_rate", "Document Rate"),
        Column::rate("options_rate", "Options Rate"),
        Column::rate("total_rate", "Total Rate"),
    ]);
    MergeLayout { head, right }
}

pub(super) fn document_row(lvl: usize, rate: &Rate<'_, DocumentModel>) -> ReportRow {
    let mut row = ReportRow::new();
    let shared = rate.left.or(rate.right);
    row.set("lvl", lvl)
        .set("type", rate.kind.to_string())
        .set("document_type", shared.map(|d| d.kind.as_str()).unwrap_or_default())
        .set("document_schema", shared.map(DocumentModel::title).unwrap_or_default())
        .set("left", rate.left.map_or(Value::Null, CompareItem::to_object))
        .set("right", rate.right.map_or(Value::Null, CompareItem::to_object))
        .set("documents", sub_rate_items(rate, DOCUMENTS_RATE))
        .set("options", sub_rate_items(rate, OPTIONS_RATE));
    for (side, doc) in [("left", rate.left), ("right", rate.right)] {
        if let Some(doc) = doc {
            row.set(&format!("{side}_id"), doc.id.clone().unwrap_or_default())
                .set(&format!("{side}_message_id"), doc.message_id.clone().unwrap_or_default())
                .set(&format!("{side}_type"), doc.kind.as_str())
                .set(&format!("{side}_schema"), doc.title())
                .set(&format!("{side}_owner"), doc.owner.clone().unwrap_or_default());
        }
    }
    row.set_rate("document_rate", rate_cell(rate, DOCUMENTS_RATE))
        .set_rate("options_rate", rate_cell(rate, OPTIONS_RATE))
        .set_rate("total_rate", rate_cell(rate, TOTAL_RATE));
    row.set_keys(rate.left.map(CompareItem::key), rate.right.map(CompareItem::key));
    row
}

/// Issued documents together with the documents they relate to
#[derive(Debug, Clone, Default)]
pub struct DocumentComparator {
    options: CompareOptions,
}

impl DocumentComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Load a document and, transitively, its relationships. Each related
    /// document is fetched once; cycles are cut at the first repeat on a path.
    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<DocumentModel> {
        let root = require(store.get_document_by_id(id).await?, "document", id)?;
        let mut records = HashMap::new();
        let mut queue = VecDeque::from([(id.to_string(), root)]);
        while let Some((next, record)) = queue.pop_front() {
            for related in relationship_ids(&record) {
                if related == next || records.contains_key(&related) || queue.iter().any(|(q, _)| *q == related) {
                    continue;
                }
                match store.get_document_by_id(&related).await? {
                    Some(found) => queue.push_back((related, found)),
                    None => log::warn!("Related document {related} of {next} not found"),
                }
            }
            records.insert(next, record);
        }
        log::info!("Loaded document {id} with {} related documents", records.len() - 1);

        let mut path = Vec::new();
        let mut model = build_tree(id, &records, &mut path)
            .ok_or_else(|| CompareError::not_found("document", id))?;
        let schemas = load_schemas(store, model.topic_id.as_deref(), options).await?;
        link_schemas(&mut model, &schemas);
        model.update(options);
        Ok(model)
    }
}

fn relationship_ids(record: &Value) -> Vec<String> {
    record
        .get("relationships")
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

fn build_tree(id: &str, records: &HashMap<String, Value>, path: &mut Vec<String>) -> Option<DocumentModel> {
    let mut doc = DocumentModel::from_json(records.get(id)?);
    path.push(id.to_string());
    let children: Vec<DocumentModel> = doc
        .relationship_ids
        .iter()
        .filter_map(|child| {
            if path.contains(child) {
                None
            } else {
                build_tree(child, records, path)
            }
        })
        .collect();
    path.pop();
    doc.set_relationships(children);
    Some(doc)
}

fn link_schemas(doc: &mut DocumentModel, schemas: &[SchemaModel]) {
    doc.set_schemas(schemas.to_vec());
    for child in &mut doc.children {
        link_schemas(child, schemas);
    }
}

impl Comparator for DocumentComparator {
    type Model = DocumentModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &DocumentModel, right: &DocumentModel) -> CompareResult {
        let rate = ComparePolicyUtils::compare_documents(left, right, &self.options);
        let rows = ComparePolicyUtils::tree_to_array(&rate, 1);
        let mut documents = ReportTable::new(document_columns());
        for (lvl, rate) in &rows {
            documents.push(document_row(*lvl, rate));
        }
        let mut tables = IndexMap::new();
        tables.insert("documents".to_string(), documents);
        CompareResult {
            left: left.info(),
            right: right.info(),
            total: CompareUtils::rows_total(rows.iter().map(|(_, rate)| *rate)),
            tables,
        }
    }

    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult> {
        merge_results(results, &[("documents", document_layout())])
    }

    fn table_to_csv(results: &[CompareResult]) -> Result<String> {
        csv_report(results, "Document", IDENTITY, &[("Data", "documents")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn document(id: &str, status: &str, relationships: &[&str]) -> Value {
        json!({
            "id": id,
            "schema": "#project",
            "topicId": "0.0.1",
            "owner": "did:owner",
            "option": { "status": status },
            "relationships": relationships,
            "document": { "credentialSubject": [{ "type": "project", "name": "A" }] }
        })
    }

    fn store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store
            .add_document(document("a", "NEW", &["a1"]))
            .add_document(document("a1", "NEW", &["a"]))
            .add_document(document("b", "APPROVED", &["b1", "missing"]))
            .add_document(document("b1", "NEW", &[]))
            .add_schema(json!({
                "id": "s", "iri": "#project", "name": "Project", "topicId": "0.0.1",
                "document": { "properties": { "name": { "type": "string" } } }
            }));
        store
    }

    #[tokio::test]
    async fn test_load_with_relationships() {
        let store = store();
        let options = CompareOptions::default();
        let a = DocumentComparator::create_model_by_id(&store, "a", &options).await.unwrap();
        assert_eq!(a.children.len(), 1);
        assert!(a.children[0].children.is_empty());
        assert_eq!(a.title(), "Project");

        let b = DocumentComparator::create_model_by_id(&store, "b", &options).await.unwrap();
        assert_eq!(b.children.len(), 1);

        let result = DocumentComparator::new(options).compare_pair(&a, &b);
        let table = result.table("documents").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].get("options_rate"), Some(&json!("0%")));
        assert_eq!(table.rows()[1].get("total_rate"), Some(&json!("100%")));
        assert_eq!(result.total, 75);
    }

    #[tokio::test]
    async fn test_missing_document() {
        let err = DocumentComparator::create_model_by_id(&MemoryStore::new(), "x", &CompareOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), CompareError::not_found("document", "x").to_string());
    }

    #[tokio::test]
    async fn test_document_csv() {
        let store = store();
        let options = CompareOptions::default();
        let a = DocumentComparator::create_model_by_id(&store, "a", &options).await.unwrap();
        let b = DocumentComparator::create_model_by_id(&store, "b", &options).await.unwrap();
        let results = DocumentComparator::new(options).compare(&[a, b]).unwrap();
        let csv = DocumentComparator::table_to_csv(&results).unwrap();
        assert!(csv.starts_with("Document 1\nDocument ID,Document Type,Document Owner,Policy,Message\na,VC,did:owner,,\n"));
        assert!(csv.ends_with("Total,75%\n"));
    }
}
