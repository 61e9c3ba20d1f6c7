//! Flat report tables and CSV export.

mod csv;
mod table;

pub use csv::Csv;
pub use table::{Column, ColumnType, ReportRow, ReportTable};
