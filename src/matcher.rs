use std::collections::{BTreeMap, HashMap};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};
use crate::models::{EntityTotal, MatchedGroup, Table};
use crate::normalize::normalize_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Case-insensitive substring.
    #[default]
    Contains,
    /// Case-insensitive regular expression.
    Regex,
}

/// Decides whether a category cell names the initiative type we are after.
#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pattern: Regex,
}

impl CategoryFilter {
    pub fn new(phrase: &str, match_type: MatchType) -> Result<Self> {
        let source = match match_type {
            MatchType::Contains => regex::escape(phrase),
            MatchType::Regex => phrase.to_string(),
        };
        let pattern = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .map_err(|e| SpendError::Settings(format!("invalid category pattern {phrase:?}: {e}")))?;
        Ok(Self { pattern })
    }

    pub fn matches(&self, category: &str) -> bool {
        self.pattern.is_match(category)
    }
}

/// Normalized key of every itemized row, computed once.
pub fn record_keys(records: &Table, name_column: usize) -> Vec<String> {
    records.column(name_column).map(normalize_name).collect()
}

/// Join over-threshold entities to itemized rows by normalized name.
///
/// Every entity key gets a group, including ones with no qualifying rows.
/// A row only ever joins the key equal to its own normalized name, and rows
/// whose name normalizes to nothing join no one. When two
/// entities share a key, the first one in `totals` (the higher ranked) owns it.
pub fn match_entities(
    totals: &[EntityTotal],
    records: &Table,
    name_column: usize,
    category_column: Option<usize>,
    filter: &CategoryFilter,
) -> BTreeMap<String, MatchedGroup> {
    let keys = record_keys(records, name_column);
    let mut rows_by_key: HashMap<&str, Vec<usize>> = HashMap::new();
    for (row, key) in keys.iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        rows_by_key.entry(key.as_str()).or_default().push(row);
    }

    let mut groups: BTreeMap<String, MatchedGroup> = BTreeMap::new();
    for entity in totals {
        let key = normalize_name(&entity.name);
        if let Some(existing) = groups.get(&key) {
            tracing::warn!(
                key = %key,
                kept = %existing.entity_name,
                ignored = %entity.name,
                "two agencies normalize to the same key"
            );
            continue;
        }
        if key.is_empty() {
            tracing::warn!(
                agency = %entity.name,
                "agency name has no letters or digits; it cannot match any department"
            );
        }

        let candidates = rows_by_key.get(key.as_str()).map(Vec::as_slice).unwrap_or(&[]);
        let department = candidates
            .first()
            .map(|&row| records.cell(row, name_column).to_string());

        let rows: Vec<usize> = match category_column {
            Some(col) => candidates
                .iter()
                .copied()
                .filter(|&row| filter.matches(records.cell(row, col)))
                .collect(),
            None => Vec::new(),
        };

        let mut initiatives: Vec<String> = Vec::new();
        if let Some(col) = category_column {
            for &row in &rows {
                let text = records.cell(row, col).trim();
                if !text.is_empty() && !initiatives.iter().any(|i| i == text) {
                    initiatives.push(text.to_string());
                }
            }
        }

        groups.insert(
            key.clone(),
            MatchedGroup {
                key,
                entity_name: entity.name.clone(),
                total: entity.total,
                department,
                rows,
                initiatives,
            },
        );
    }
    groups
}
