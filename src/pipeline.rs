use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::{aggregate, DEFAULT_THRESHOLD};
use crate::coerce::{parse_stripped, sum_or_zero};
use crate::columns::{
    detect_category_column, detect_name_column, detect_numeric_columns, CategoryColumn,
    ColumnResolution, DEFAULT_NAME_COLUMNS,
};
use crate::error::Result;
use crate::fmt::money;
use crate::matcher::{match_entities, CategoryFilter, MatchType};
use crate::models::{EntityTotal, MatchedGroup, SummaryRow, Table};

pub const DEFAULT_CATEGORY_PHRASE: &str = "covid response";
pub const INITIATIVE_DELIMITER: &str = " | ";
pub const MATCHED_KEY_COLUMN: &str = "Matched_Key";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub threshold_amount: f64,
    pub category_phrase: String,
    pub match_type: MatchType,
    pub include_unmatched_placeholders: bool,
    pub emit_detailed_rows: bool,
    pub date_column: String,
    pub name_columns: Vec<String>,
    pub category_column: CategoryColumn,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold_amount: DEFAULT_THRESHOLD,
            category_phrase: DEFAULT_CATEGORY_PHRASE.to_string(),
            match_type: MatchType::default(),
            include_unmatched_placeholders: false,
            emit_detailed_rows: false,
            date_column: "Date".to_string(),
            name_columns: DEFAULT_NAME_COLUMNS.iter().map(|s| s.to_string()).collect(),
            category_column: CategoryColumn::default(),
        }
    }
}

pub struct CovidReport {
    /// Agencies over the threshold, largest first.
    pub ranked: Vec<EntityTotal>,
    pub name_column: Option<ColumnResolution>,
    pub category_column: Option<ColumnResolution>,
    pub numeric_columns: Vec<String>,
    /// One group per over-threshold key, in key order.
    pub groups: BTreeMap<String, MatchedGroup>,
    pub summary: Vec<SummaryRow>,
    pub detailed: Option<Table>,
}

impl CovidReport {
    pub fn target_count(&self) -> usize {
        self.groups.len()
    }

    pub fn matched_count(&self) -> usize {
        self.groups.values().filter(|g| !g.is_empty()).count()
    }

    pub fn unmatched_keys(&self) -> Vec<&str> {
        self.groups
            .values()
            .filter(|g| g.is_empty())
            .map(|g| g.key.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub fn run(spending: &Table, initiatives: &Table, config: &PipelineConfig) -> Result<CovidReport> {
    let filter = CategoryFilter::new(&config.category_phrase, config.match_type)?;
    let ranked = aggregate(spending, &config.date_column, config.threshold_amount);

    let name_column = detect_name_column(initiatives, &config.name_columns);
    let category_column = detect_category_column(initiatives, &config.category_column);
    if category_column.is_none() {
        tracing::warn!(
            strategy = ?config.category_column,
            columns = initiatives.width(),
            "initiative file has no category column; no rows can qualify"
        );
    }

    let mut excluded = Vec::new();
    excluded.extend(name_column.as_ref().map(|c| c.index));
    excluded.extend(category_column.as_ref().map(|c| c.index));
    let numeric = detect_numeric_columns(initiatives, &excluded);
    tracing::debug!(
        name = ?name_column.as_ref().map(|c| &c.header),
        category = ?category_column.as_ref().map(|c| &c.header),
        numeric = numeric.len(),
        "resolved initiative columns"
    );

    let groups = match &name_column {
        Some(name) => match_entities(
            &ranked,
            initiatives,
            name.index,
            category_column.as_ref().map(|c| c.index),
            &filter,
        ),
        None => match_entities(&ranked, &Table::default(), 0, None, &filter),
    };

    let summary = groups
        .values()
        .filter(|g| !g.is_empty() || config.include_unmatched_placeholders)
        .map(|g| summarize_group(g, initiatives, &numeric))
        .collect();

    let detailed = if config.emit_detailed_rows {
        Some(detailed_rows(
            &groups,
            initiatives,
            name_column.as_ref().map(|c| c.index),
            config.include_unmatched_placeholders,
        ))
    } else {
        None
    };

    Ok(CovidReport {
        ranked,
        numeric_columns: numeric.iter().map(|&c| initiatives.headers[c].clone()).collect(),
        name_column,
        category_column,
        groups,
        summary,
        detailed,
    })
}

fn summarize_group(group: &MatchedGroup, initiatives: &Table, numeric: &[usize]) -> SummaryRow {
    let sums = numeric
        .iter()
        .map(|&col| {
            let values = group.rows.iter().map(|&row| parse_stripped(initiatives.cell(row, col)));
            (initiatives.headers[col].clone(), sum_or_zero(values))
        })
        .collect();
    SummaryRow {
        department: group.display_name().to_string(),
        total_spend: group.total,
        num_rows: group.rows.len(),
        initiatives: group.initiatives.join(INITIATIVE_DELIMITER),
        sums,
    }
}

/// Every qualifying itemized row, tagged with its key. Placeholder rows carry
/// only the display name.
fn detailed_rows(
    groups: &BTreeMap<String, MatchedGroup>,
    initiatives: &Table,
    name_column: Option<usize>,
    placeholders: bool,
) -> Table {
    let mut headers = initiatives.headers.clone();
    headers.push(MATCHED_KEY_COLUMN.to_string());

    let mut rows = Vec::new();
    for group in groups.values() {
        if group.is_empty() {
            if placeholders {
                let mut row = vec![String::new(); initiatives.width()];
                if let Some(col) = name_column {
                    row[col] = group.display_name().to_string();
                }
                row.push(group.key.clone());
                rows.push(row);
            }
            continue;
        }
        for &r in &group.rows {
            let mut row = initiatives.rows[r].clone();
            row.push(group.key.clone());
            rows.push(row);
        }
    }
    Table::new(headers, rows)
}

// ---------------------------------------------------------------------------
// Output formatting
// ---------------------------------------------------------------------------

pub fn summary_headers(numeric_columns: &[String]) -> Vec<String> {
    let mut headers: Vec<String> = [
        "Department",
        "Total_Spend_From_First_File",
        "Num_Covid_Rows",
        "Covid_Initiatives",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    headers.extend(numeric_columns.iter().map(|c| format!("Sum_{c}")));
    headers
}

pub fn format_summary_row(row: &SummaryRow) -> Vec<String> {
    let mut out = vec![
        row.department.clone(),
        money(row.total_spend),
        row.num_rows.to_string(),
        row.initiatives.clone(),
    ];
    out.extend(row.sums.iter().map(|(_, v)| money(*v)));
    out
}

/// The summary as display strings, currency fields formatted.
pub fn format_summary(report: &CovidReport) -> Table {
    Table::new(
        summary_headers(&report.numeric_columns),
        report.summary.iter().map(format_summary_row).collect(),
    )
}

/// Ranked list for CSV output: `Agency`, `Total_Spend` to two decimals.
pub fn ranked_table(ranked: &[EntityTotal]) -> Table {
    Table::new(
        vec!["Agency".to_string(), "Total_Spend".to_string()],
        ranked
            .iter()
            .map(|t| vec![t.name.clone(), format!("{:.2}", t.total)])
            .collect(),
    )
}
