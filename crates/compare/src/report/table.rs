use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a column is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    String,
    Object,
}

/// Column of a report table. Columns with an empty label are data-only and
/// are not exported to CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: ColumnType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            display: None,
        }
    }

    /// Percentage column
    pub fn rate(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            display: Some("Rate".to_string()),
            ..Self::new(name, label, ColumnType::Number)
        }
    }

    /// Unlabelled data column
    pub fn data(name: impl Into<String>, kind: ColumnType) -> Self {
        Self::new(name, "", kind)
    }

    /// Same column renamed with a right-hand index suffix
    pub fn indexed(&self, index: usize) -> Self {
        Self {
            name: format!("{}_{}", self.name, index),
            ..self.clone()
        }
    }

    pub fn is_exported(&self) -> bool {
        !self.label.is_empty()
    }
}

/// One report row: ordered named cells plus the identity keys of both sides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow {
    cells: IndexMap<String, Value>,
    #[serde(skip)]
    left_key: Option<String>,
    #[serde(skip)]
    right_key: Option<String>,
}

impl ReportRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.cells.insert(name.to_string(), value.into());
        self
    }

    /// Percentage cell: `"n%"` when both sides exist, `"-"` otherwise
    pub fn set_rate(&mut self, name: &str, rate: Option<u32>) -> &mut Self {
        let text = rate.map_or_else(|| "-".to_string(), |r| format!("{r}%"));
        self.set(name, text)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cells.get(name)
    }

    pub fn cells(&self) -> &IndexMap<String, Value> {
        &self.cells
    }

    pub fn set_keys(&mut self, left: Option<String>, right: Option<String>) -> &mut Self {
        self.left_key = left;
        self.right_key = right;
        self
    }

    pub fn left_key(&self) -> Option<&str> {
        self.left_key.as_deref()
    }

    pub fn right_key(&self) -> Option<&str> {
        self.right_key.as_deref()
    }
}

/// Columns plus rows, serialised as `{ columns, report }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub columns: Vec<Column>,
    pub report: Vec<ReportRow>,
}

impl ReportTable {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            report: Vec::new(),
        }
    }

    pub fn push(&mut self, row: ReportRow) {
        self.report.push(row);
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.report.len()
    }

    pub fn is_empty(&self) -> bool {
        self.report.is_empty()
    }

    pub fn exported_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_exported())
    }
}
