use super::document::{document_columns, document_layout, document_row, IDENTITY};
use super::{csv_report, merge_results, require, Comparator};
use crate::error::Result;
use crate::models::RecordModel;
use crate::options::CompareOptions;
use crate::rates::{CompareItem, RateType};
use crate::report::{ReportRow, ReportTable};
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::DocumentStore;
use crate::utils::{ComparePolicyUtils, CompareUtils};
use indexmap::IndexMap;

/// Policy run records: documents compared in issue order
#[derive(Debug, Clone, Default)]
pub struct RecordComparator {
    options: CompareOptions,
}

impl RecordComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<RecordModel> {
        let record = require(store.get_record_by_id(id).await?, "record", id)?;
        let mut model = RecordModel::from_json(&record, options)?;
        model.update(options);
        log::info!("Loaded record {id} with {} documents", model.documents.len());
        Ok(model)
    }
}

fn record_row(left: &RecordModel, right: &RecordModel, total: u32) -> ReportRow {
    let kind = if total == 100 { RateType::Equal } else { RateType::Partly };
    let mut row = ReportRow::new();
    row.set("lvl", 1)
        .set("type", kind.to_string())
        .set("document_type", "record")
        .set("left", left.to_object())
        .set("right", right.to_object())
        .set("left_id", left.key())
        .set("right_id", right.key())
        .set_rate("total_rate", Some(total));
    row.set_keys(Some(left.key()), Some(right.key()));
    row
}

impl Comparator for RecordComparator {
    type Model = RecordModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &RecordModel, right: &RecordModel) -> CompareResult {
        let rates = ComparePolicyUtils::compare_record(left, right, &self.options);
        let total = CompareUtils::flat_total(&rates);
        let mut documents = ReportTable::new(document_columns());
        documents.push(record_row(left, right, total));
        for rate in &rates {
            documents.push(document_row(2, rate));
        }
        let mut tables = IndexMap::new();
        tables.insert("documents".to_string(), documents);
        CompareResult {
            left: left.info(),
            right: right.info(),
            total,
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
    use serde_json::{json, Value};

    fn record(id: &str, amounts: &[i64]) -> Value {
        let documents: Vec<Value> = amounts
            .iter()
            .map(|amount| {
                json!({
                    "type": "vc",
                    "document": {
                        "schema": "#report",
                        "document": { "credentialSubject": [{ "amount": amount }] }
                    }
                })
            })
            .collect();
        json!({ "id": id, "documents": documents })
    }

    #[tokio::test]
    async fn test_record_rows() {
        let mut store = MemoryStore::new();
        store
            .add_record(record("r1", &[1, 2]))
            .add_record(record("r2", &[1, 3, 4]));
        let options = CompareOptions::default();
        let r1 = RecordComparator::create_model_by_id(&store, "r1", &options).await.unwrap();
        let r2 = RecordComparator::create_model_by_id(&store, "r2", &options).await.unwrap();

        let result = RecordComparator::new(options).compare_pair(&r1, &r2);
        let table = result.table("documents").unwrap();
        let kinds: Vec<&Value> = table.rows().iter().filter_map(|r| r.get("type")).collect();
        assert_eq!(kinds, vec![&json!("Partly"), &json!("Equal"), &json!("Partly"), &json!("Added")]);
        assert_eq!(table.rows()[0].get("lvl"), Some(&json!(1)));
        assert_eq!(table.rows()[3].get("total_rate"), Some(&json!("-")));
        assert_eq!(table.rows()[0].get("total_rate"), Some(&json!(format!("{}%", result.total))));
        assert!(result.total < 100);
    }

    #[tokio::test]
    async fn test_missing_record() {
        let err = RecordComparator::create_model_by_id(&MemoryStore::new(), "r", &CompareOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown record: r");
    }
}
