use serde::{Deserialize, Serialize};

use crate::coerce::parse_stripped;
use crate::models::Table;

/// Header names tried, in order, when looking for the department column.
pub const DEFAULT_NAME_COLUMNS: &[&str] = &["Department"];

/// Wider preference list used by `diagnose`.
pub const DIAGNOSTIC_NAME_COLUMNS: &[&str] = &[
    "department",
    "dept",
    "department name",
    "agency",
    "agency name",
];

/// A resolved column role. `via_fallback` is set when no preferred header
/// matched and a positional default was taken instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnResolution {
    pub index: usize,
    pub header: String,
    pub via_fallback: bool,
}

/// How the category/initiative column of the itemized table is located.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryColumn {
    /// Zero-based column position, independent of header text.
    Position(usize),
    /// Header names tried case-insensitively; falls back to the second column.
    Header(Vec<String>),
}

impl Default for CategoryColumn {
    fn default() -> Self {
        Self::Position(1)
    }
}

fn find_header<S: AsRef<str>>(table: &Table, preferred: &[S]) -> Option<usize> {
    preferred.iter().find_map(|name| {
        table
            .headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name.as_ref()))
    })
}

fn resolved(table: &Table, index: usize, via_fallback: bool) -> Option<ColumnResolution> {
    table.headers.get(index).map(|header| ColumnResolution {
        index,
        header: header.clone(),
        via_fallback,
    })
}

/// First header matching `preferred` (priority order, case-insensitive),
/// else the first column. `None` only for a table with no columns.
pub fn detect_name_column<S: AsRef<str>>(table: &Table, preferred: &[S]) -> Option<ColumnResolution> {
    match find_header(table, preferred) {
        Some(i) => resolved(table, i, false),
        None => {
            let fallback = resolved(table, 0, true);
            if let Some(res) = &fallback {
                tracing::warn!(
                    column = %res.header,
                    "no preferred name column found, using the first column"
                );
            }
            fallback
        }
    }
}

pub fn detect_category_column(table: &Table, strategy: &CategoryColumn) -> Option<ColumnResolution> {
    match strategy {
        CategoryColumn::Position(i) => resolved(table, *i, false),
        CategoryColumn::Header(names) => match find_header(table, names) {
            Some(i) => resolved(table, i, false),
            None => resolved(table, 1, true),
        },
    }
}

/// Columns (outside `excluded`) where at least one cell parses as a number
/// after stripping non-numeric characters. Returned in source order.
pub fn detect_numeric_columns(table: &Table, excluded: &[usize]) -> Vec<usize> {
    (0..table.width())
        .filter(|c| !excluded.contains(c))
        .filter(|&c| table.column(c).any(|cell| parse_stripped(cell).is_some()))
        .collect()
}
