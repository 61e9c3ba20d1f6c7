use super::columns::{rate_cell, sub_rate_items};
use super::{csv_report, merge_results, require, Comparator, IdentityColumns};
use crate::error::Result;
use crate::models::{FieldModel, SchemaModel};
use crate::options::CompareOptions;
use crate::rates::{CompareItem, Rate, PROPERTIES_RATE, TOTAL_RATE};
use crate::report::{Column, ColumnType, ReportRow, ReportTable};
use crate::result::{CompareResult, MultiCompareResult};
use crate::store::DocumentStore;
use crate::utils::{CellSource, ComparePolicyUtils, CompareUtils, MergeLayout};
use indexmap::IndexMap;
use serde_json::Value;

const IDENTITY: IdentityColumns = &[
    ("Schema ID", "id"),
    ("Schema IRI", "iri"),
    ("Schema Name", "name"),
    ("Schema Description", "description"),
    ("Schema Topic", "topicId"),
    ("Schema Version", "version"),
];

fn field_columns() -> Vec<Column> {
    vec![
        Column::new("lvl", "Offset", ColumnType::Number),
        Column::new("left_index", "Index", ColumnType::Number),
        Column::new("left_name", "Name", ColumnType::String),
        Column::new("left_type", "Type", ColumnType::String),
        Column::new("right_index", "Index", ColumnType::Number),
        Column::new("right_name", "Name", ColumnType::String),
        Column::new("right_type", "Type", ColumnType::String),
        Column::rate("prop_rate", "Prop Rate"),
        Column::rate("total_rate", "Total Rate"),
        Column::data("type", ColumnType::String),
        Column::data("left", ColumnType::Object),
        Column::data("right", ColumnType::Object),
        Column::data("properties", ColumnType::Object),
    ]
}

fn field_layout() -> MergeLayout {
    MergeLayout {
        head: vec![
            (Column::new("lvl", "Offset", ColumnType::Number), CellSource::Shared),
            (Column::data("left", ColumnType::Object), CellSource::Left),
            (Column::new("left_index", "Index", ColumnType::Number), CellSource::Left),
            (Column::new("left_name", "Name", ColumnType::String), CellSource::Left),
            (Column::new("left_type", "Type", ColumnType::String), CellSource::Left),
            (Column::data("properties", ColumnType::Object), CellSource::Rates),
        ],
        right: vec![
            Column::data("type", ColumnType::String),
            Column::data("right", ColumnType::Object),
            Column::new("right_index", "Index", ColumnType::Number),
            Column::new("right_name", "Name", ColumnType::String),
            Column::new("right_type", "Type", ColumnType::String),
            Column::rate("prop_rate", "Prop Rate"),
            Column::rate("total_rate", "Total Rate"),
        ],
    }
}

fn field_row(lvl: usize, rate: &Rate<'_, FieldModel>) -> ReportRow {
    let mut row = ReportRow::new();
    row.set("lvl", lvl)
        .set("type", rate.kind.to_string())
        .set("left", rate.left.map_or(Value::Null, CompareItem::to_object))
        .set("right", rate.right.map_or(Value::Null, CompareItem::to_object))
        .set("properties", sub_rate_items(rate, PROPERTIES_RATE));
    for (side, field) in [("left", rate.left), ("right", rate.right)] {
        if let Some(field) = field {
            row.set(&format!("{side}_index"), field.index)
                .set(&format!("{side}_name"), field.name.as_str())
                .set(&format!("{side}_type"), field.field_type.clone().unwrap_or_default());
        }
    }
    row.set_rate("prop_rate", rate_cell(rate, PROPERTIES_RATE))
        .set_rate("total_rate", rate_cell(rate, TOTAL_RATE));
    row.set_keys(rate.left.map(CompareItem::key), rate.right.map(CompareItem::key));
    row
}

/// Schemas: field trees aligned by name within each level
#[derive(Debug, Clone, Default)]
pub struct SchemaComparator {
    options: CompareOptions,
}

impl SchemaComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub async fn create_model_by_id(
        store: &dyn DocumentStore,
        id: &str,
        options: &CompareOptions,
    ) -> Result<SchemaModel> {
        let record = require(store.get_schema_by_id(id).await?, "schema", id)?;
        SchemaModel::from_json(&record, options)
    }
}

impl Comparator for SchemaComparator {
    type Model = SchemaModel;

    fn options(&self) -> &CompareOptions {
        &self.options
    }

    fn compare_pair(&self, left: &SchemaModel, right: &SchemaModel) -> CompareResult {
        let rates = ComparePolicyUtils::compare_fields(left.fields(), right.fields(), &self.options);
        let mut fields = ReportTable::new(field_columns());
        for (lvl, rate) in ComparePolicyUtils::forest_to_array(&rates, 1) {
            fields.push(field_row(lvl, rate));
        }
        let mut tables = IndexMap::new();
        tables.insert("fields".to_string(), fields);
        CompareResult {
            left: left.info(),
            right: right.info(),
            total: CompareUtils::forest_total(&rates),
            tables,
        }
    }

    fn merge_compare_results(results: &[CompareResult]) -> Result<MultiCompareResult> {
        merge_results(results, &[("fields", field_layout())])
    }

    fn table_to_csv(results: &[CompareResult]) -> Result<String> {
        csv_report(results, "Schema", IDENTITY, &[("Schema Fields", "fields")])
    }
}
