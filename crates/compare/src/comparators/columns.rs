//! Column sets and row builders shared by the block-tree comparators.

use crate::models::{BlockModel, ObjectModel};
use crate::rates::{
    CompareItem, Rate, SubRate, ARTIFACTS_RATE, EVENTS_RATE, INDEX_RATE, PERMISSIONS_RATE,
    PROPERTIES_RATE, TOTAL_RATE,
};
use crate::report::{Column, ColumnType, ReportRow};
use crate::utils::{CellSource, MergeLayout};
use serde_json::Value;

pub(crate) fn block_columns() -> Vec<Column> {
    vec![
        Column::new("lvl", "Offset", ColumnType::Number),
        Column::new("left_index", "Index", ColumnType::Number),
        Column::new("left_type", "Type", ColumnType::String),
        Column::new("left_tag", "Tag", ColumnType::String),
        Column::new("right_index", "Index", ColumnType::Number),
        Column::new("right_type", "Type", ColumnType::String),
        Column::new("right_tag", "Tag", ColumnType::String),
        Column::rate("index_rate", "Index Rate"),
        Column::rate("permission_rate", "Permission Rate"),
        Column::rate("prop_rate", "Prop Rate"),
        Column::rate("event_rate", "Event Rate"),
        Column::rate("artifacts_rate", "Artifact Rate"),
        Column::rate("total_rate", "Total Rate"),
        Column::data("type", ColumnType::String),
        Column::data("block_type", ColumnType::String),
        Column::data("left", ColumnType::Object),
        Column::data("right", ColumnType::Object),
        Column::data("properties", ColumnType::Object),
        Column::data("events", ColumnType::Object),
        Column::data("permissions", ColumnType::Object),
        Column::data("artifacts", ColumnType::Object),
    ]
}

pub(crate) fn object_columns() -> Vec<Column> {
    vec![
        Column::new("left_name", "Name", ColumnType::String),
        Column::new("right_name", "Name", ColumnType::String),
        Column::rate("total_rate", "Total Rate"),
        Column::data("left", ColumnType::Object),
        Column::data("right", ColumnType::Object),
        Column::data("type", ColumnType::String),
        Column::data("properties", ColumnType::Object),
    ]
}

pub(crate) fn block_layout() -> MergeLayout {
    MergeLayout {
        head: vec![
            (Column::new("lvl", "Offset", ColumnType::Number), CellSource::Shared),
            (Column::data("block_type", ColumnType::String), CellSource::Shared),
            (Column::data("left", ColumnType::Object), CellSource::Left),
            (Column::new("left_index", "Index", ColumnType::Number), CellSource::Left),
            (Column::new("left_type", "Type", ColumnType::String), CellSource::Left),
            (Column::new("left_tag", "Tag", ColumnType::String), CellSource::Left),
            (Column::data("properties", ColumnType::Object), CellSource::Rates),
            (Column::data("events", ColumnType::Object), CellSource::Rates),
            (Column::data("permissions", ColumnType::Object), CellSource::Rates),
            (Column::data("artifacts", ColumnType::Object), CellSource::Rates),
        ],
        right: vec![
            Column::data("type", ColumnType::String),
            Column::data("right", ColumnType::Object),
            Column::new("right_index", "Index", ColumnType::Number),
            Column::new("right_type", "Type", ColumnType::String),
            Column::new("right_tag", "Tag", ColumnType::String),
            Column::rate("index_rate", "Index Rate"),
            Column::rate("permission_rate", "Permission Rate"),
            Column::rate("prop_rate", "Prop Rate"),
            Column::rate("event_rate", "Event Rate"),
            Column::rate("artifacts_rate", "Artifact Rate"),
            Column::rate("total_rate", "Total Rate"),
        ],
    }
}

pub(crate) fn object_layout() -> MergeLayout {
    MergeLayout {
        head: vec![
            (Column::data("left", ColumnType::Object), CellSource::Left),
            (Column::new("left_name", "Name", ColumnType::String), CellSource::Left),
            (Column::data("properties", ColumnType::Object), CellSource::Rates),
        ],
        right: vec![
            Column::data("right", ColumnType::Object),
            Column::new("right_name", "Name", ColumnType::String),
            Column::rate("total_rate", "Total Rate"),
            Column::data("type", ColumnType::String),
        ],
    }
}

/// Item-level rates of a sub-rate, `[]` when it was not computed
pub(crate) fn sub_rate_items<T>(rate: &Rate<'_, T>, name: &str) -> Value {
    Value::Array(rate.sub_rate(name).map(|s: &SubRate| s.items.clone()).unwrap_or_default())
}

/// Rate cell value: `None` renders as `-`
pub(crate) fn rate_cell<T>(rate: &Rate<'_, T>, name: &str) -> Option<u32> {
    if rate.is_paired() {
        rate.rate_value(name)
    } else {
        None
    }
}

pub(crate) fn block_row(lvl: usize, rate: &Rate<'_, BlockModel>) -> ReportRow {
    let mut row = ReportRow::new();
    row.set("lvl", lvl).set("type", rate.kind.to_string());
    let block_type = rate
        .left
        .or(rate.right)
        .map(|b| b.block_type.clone())
        .unwrap_or_default();
    row.set("block_type", block_type);
    for name in ["properties", "events", "permissions", "artifacts"] {
        row.set(name, sub_rate_items(rate, name));
    }
    row.set("left", rate.left.map_or(Value::Null, CompareItem::to_object));
    row.set("right", rate.right.map_or(Value::Null, CompareItem::to_object));
    if let Some(left) = rate.left {
        row.set("left_type", left.block_type.as_str())
            .set("left_tag", left.tag.as_str())
            .set("left_index", left.index);
    }
    if let Some(right) = rate.right {
        row.set("right_type", right.block_type.as_str())
            .set("right_tag", right.tag.as_str())
            .set("right_index", right.index);
    }
    for (column, sub_rate) in [
        ("prop_rate", PROPERTIES_RATE),
        ("event_rate", EVENTS_RATE),
        ("index_rate", INDEX_RATE),
        ("permission_rate", PERMISSIONS_RATE),
        ("artifacts_rate", ARTIFACTS_RATE),
        ("total_rate", TOTAL_RATE),
    ] {
        row.set_rate(column, rate_cell(rate, sub_rate));
    }
    row.set_keys(rate.left.map(CompareItem::key), rate.right.map(CompareItem::key));
    row
}

pub(crate) fn object_row(rate: &Rate<'_, ObjectModel>) -> ReportRow {
    let mut row = ReportRow::new();
    row.set("left", rate.left.map_or(Value::Null, CompareItem::to_object))
        .set("right", rate.right.map_or(Value::Null, CompareItem::to_object))
        .set("type", rate.kind.to_string())
        .set("properties", sub_rate_items(rate, PROPERTIES_RATE));
    if let Some(left) = rate.left {
        row.set("left_name", left.key.as_str());
    }
    if let Some(right) = rate.right {
        row.set("right_name", right.key.as_str());
    }
    row.set_rate("total_rate", rate_cell(rate, TOTAL_RATE));
    row.set_keys(rate.left.map(CompareItem::key), rate.right.map(CompareItem::key));
    row
}
