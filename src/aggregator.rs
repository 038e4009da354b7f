use std::cmp::Ordering;

use crate::coerce::{coerce_column, sum_or_zero};
use crate::models::{EntityTotal, Table};

pub const DEFAULT_THRESHOLD: f64 = 1_000_000.0;

/// Indices of the entity columns: every column except the date column
/// (case-insensitive) and headers left blank.
pub fn value_columns(table: &Table, date_column: &str) -> Vec<usize> {
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !h.eq_ignore_ascii_case(date_column))
        .filter(|(i, h)| {
            if h.trim().is_empty() {
                tracing::warn!(column = i, "skipping time-series column with a blank header");
                false
            } else {
                true
            }
        })
        .map(|(i, _)| i)
        .collect()
}

/// Sum every entity column top to bottom, in source column order.
/// Missing cells are left out; a column with nothing present totals zero.
pub fn column_totals(table: &Table, date_column: &str) -> Vec<EntityTotal> {
    value_columns(table, date_column)
        .into_iter()
        .map(|col| EntityTotal {
            name: table.headers[col].clone(),
            total: sum_or_zero(coerce_column(table.column(col))),
        })
        .collect()
}

/// Keep totals strictly above `threshold`, largest first. Ties keep column order.
pub fn rank_over_threshold(totals: Vec<EntityTotal>, threshold: f64) -> Vec<EntityTotal> {
    let mut over: Vec<EntityTotal> = totals.into_iter().filter(|t| t.total > threshold).collect();
    over.sort_by(|a, b| b.total.partial_cmp(&a.total).unwrap_or(Ordering::Equal));
    over
}

pub fn aggregate(table: &Table, date_column: &str, threshold: f64) -> Vec<EntityTotal> {
    rank_over_threshold(column_totals(table, date_column), threshold)
}
