use crate::report::{Column, ReportRow, ReportTable};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;

/// One merged row: slot 0 holds the left side, slot `i` the row of the
/// `i`-th pairwise table.
#[derive(Debug, Clone)]
pub struct MergedRow<'a> {
    pub cols: Vec<Option<&'a ReportRow>>,
}

impl<'a> MergedRow<'a> {
    fn new(size: usize) -> Self {
        Self {
            cols: vec![None; size + 1],
        }
    }

    /// First present column
    pub fn first(&self) -> Option<&'a ReportRow> {
        self.cols.iter().flatten().next().copied()
    }

    pub fn left_key(&self) -> Option<&'a str> {
        self.cols.iter().flatten().find_map(|row| row.left_key())
    }
}

/// Where a head column of a merged table takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSource {
    /// First present column
    Shared,
    /// Left side only
    Left,
    /// Sub-rate arrays of every column, merged by item key
    Rates,
}

/// Column layout of a merged table: head columns once, right columns once
/// per pairwise table with a `_i` suffix.
#[derive(Debug, Clone, Default)]
pub struct MergeLayout {
    pub head: Vec<(Column, CellSource)>,
    pub right: Vec<Column>,
}

/// N-way merge of pairwise results that share the same left model
pub struct MultiCompareUtils;

impl MultiCompareUtils {
    /// Align the rows of K pairwise tables.
    ///
    /// Rows with a left side are matched by `(left key, occurrence)` and keep
    /// the left order. Right-only rows stay after the left row they followed
    /// and are matched across tables by `(right key, occurrence)` within that
    /// slot. Every input row ends up in exactly one merged row.
    pub fn merge_tables<'a>(tables: &[&'a ReportTable]) -> Vec<MergedRow<'a>> {
        let size = tables.len();
        let mut lefts: Vec<MergedRow<'a>> = Vec::new();
        let mut left_index: HashMap<(String, usize), usize> = HashMap::new();
        // slots[j] holds right-only rows after left row j - 1
        let mut slots: Vec<Vec<MergedRow<'a>>> = vec![Vec::new()];

        for (t, &table) in tables.iter().enumerate() {
            let mut seen: HashMap<String, usize> = HashMap::new();
            let mut anchor = 0;
            for row in table.rows() {
                match row.left_key() {
                    Some(key) => {
                        let occurrence = Self::next_occurrence(&mut seen, key);
                        let id = (key.to_string(), occurrence);
                        let j = match left_index.get(&id) {
                            Some(&j) => j,
                            None => {
                                let mut merged = MergedRow::new(size);
                                merged.cols[0] = Some(row);
                                lefts.push(merged);
                                slots.push(Vec::new());
                                left_index.insert(id, lefts.len() - 1);
                                lefts.len() - 1
                            }
                        };
                        lefts[j].cols[t + 1] = Some(row);
                        anchor = j + 1;
                    }
                    None => {
                        let key = row.right_key().unwrap_or_default();
                        let slot = &mut slots[anchor];
                        let free = slot.iter_mut().find(|m| {
                            m.cols[t + 1].is_none()
                                && m.first().and_then(ReportRow::right_key).unwrap_or_default() == key
                        });
                        match free {
                            Some(merged) => merged.cols[t + 1] = Some(row),
                            None => {
                                let mut merged = MergedRow::new(size);
                                merged.cols[t + 1] = Some(row);
                                slot.push(merged);
                            }
                        }
                    }
                }
            }
        }

        let mut slots = slots.into_iter();
        let mut out: Vec<MergedRow<'a>> = slots.next().unwrap_or_default();
        for (left, slot) in lefts.into_iter().zip(slots) {
            out.push(left);
            out.extend(slot);
        }
        out
    }

    fn next_occurrence(seen: &mut HashMap<String, usize>, key: &str) -> usize {
        let counter = seen.entry(key.to_string()).or_insert(0);
        let occurrence = *counter;
        *counter += 1;
        occurrence
    }

    /// Merge sub-rate arrays (one per column, `None` when absent) by their
    /// items' `key`. Each output row has one entry per column, `null` where
    /// that column has no matching item.
    pub fn merge_rates(data: &[Option<&Value>]) -> Vec<Vec<Value>> {
        let mut rows: IndexMap<(String, usize), Vec<Value>> = IndexMap::new();
        for (c, items) in data.iter().enumerate() {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for item in items.and_then(|v| v.as_array()).into_iter().flatten() {
                let key = item
                    .get("key")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                let occurrence = Self::next_occurrence(&mut seen, key);
                let row = rows
                    .entry((key.to_string(), occurrence))
                    .or_insert_with(|| vec![Value::Null; data.len()]);
                row[c] = item.clone();
            }
        }
        rows.into_values().collect()
    }

    /// Build the merged report table for `layout`. Each row's `size` is the
    /// number of models: the left plus one per table.
    pub fn merge_table(tables: &[&ReportTable], layout: &MergeLayout) -> ReportTable {
        let size = tables.len();
        let mut columns: Vec<Column> = layout.head.iter().map(|(c, _)| c.clone()).collect();
        for i in 1..=size {
            columns.extend(layout.right.iter().map(|c| c.indexed(i)));
        }
        let mut table = ReportTable::new(columns);

        for merged in Self::merge_tables(tables) {
            let mut row = ReportRow::new();
            row.set("size", size + 1);
            for (column, source) in &layout.head {
                let name = column.name.as_str();
                let value = match source {
                    CellSource::Shared => merged.first().and_then(|r| r.get(name)).cloned(),
                    CellSource::Left => merged.cols[0].and_then(|r| r.get(name)).cloned(),
                    CellSource::Rates => {
                        let data: Vec<Option<&Value>> =
                            merged.cols.iter().map(|c| c.and_then(|r| r.get(name))).collect();
                        let rows: Vec<Value> =
                            Self::merge_rates(&data).into_iter().map(Value::Array).collect();
                        Some(Value::Array(rows))
                    }
                };
                if let Some(value) = value {
                    row.set(name, value);
                }
            }
            // Every right column group is present, `null` where that table has no row
            for (i, col) in merged.cols.iter().enumerate().skip(1) {
                for column in &layout.right {
                    let value = col
                        .and_then(|r| r.get(&column.name))
                        .cloned()
                        .unwrap_or(Value::Null);
                    row.set(&format!("{}_{}", column.name, i), value);
                }
            }
            let right_key = merged.first().and_then(ReportRow::right_key).map(str::to_string);
            row.set_keys(merged.left_key().map(str::to_string), right_key);
            table.push(row);
        }
        table
    }
}
