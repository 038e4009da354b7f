use std::collections::BTreeSet;

use crate::aggregator::{aggregate, value_columns};
use crate::columns::{detect_name_column, ColumnResolution, DIAGNOSTIC_NAME_COLUMNS};
use crate::models::{EntityTotal, Table};
use crate::normalize::normalize_name;

/// How well the two files line up after normalization.
pub struct MatchDiagnostics {
    pub name_column: Option<ColumnResolution>,
    pub agency_keys: usize,
    pub department_keys: usize,
    pub intersection: Vec<String>,
    pub only_agencies: Vec<String>,
    pub only_departments: Vec<String>,
    pub intersection_size: usize,
    pub top_agencies: Vec<EntityTotal>,
}

fn sample_keys<'a, I: Iterator<Item = &'a String>>(iter: I, limit: usize) -> Vec<String> {
    iter.take(limit).cloned().collect()
}

pub fn diagnose(
    spending: &Table,
    initiatives: &Table,
    date_column: &str,
    threshold: f64,
    sample: usize,
) -> MatchDiagnostics {
    let agencies: BTreeSet<String> = value_columns(spending, date_column)
        .into_iter()
        .map(|c| normalize_name(&spending.headers[c]))
        .filter(|k| !k.is_empty())
        .collect();

    let name_column = detect_name_column(initiatives, DIAGNOSTIC_NAME_COLUMNS);
    let departments: BTreeSet<String> = match &name_column {
        Some(col) => initiatives
            .column(col.index)
            .map(normalize_name)
            .filter(|k| !k.is_empty())
            .collect(),
        None => BTreeSet::new(),
    };

    let mut top_agencies = aggregate(spending, date_column, threshold);
    top_agencies.truncate(10);

    MatchDiagnostics {
        agency_keys: agencies.len(),
        department_keys: departments.len(),
        intersection_size: agencies.intersection(&departments).count(),
        intersection: sample_keys(agencies.intersection(&departments), sample),
        only_agencies: sample_keys(agencies.difference(&departments), sample),
        only_departments: sample_keys(departments.difference(&agencies), sample),
        name_column,
        top_agencies,
    }
}
