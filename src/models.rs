/// An in-memory CSV table: trimmed headers plus rows of raw text cells.
/// Every row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> impl Iterator<Item = &str> + '_ {
        (0..self.rows.len()).map(move |row| self.cell(row, col))
    }
}

/// Sum of one time-series column.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityTotal {
    pub name: String,
    pub total: f64,
}

/// Itemized rows joined to one over-threshold entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedGroup {
    pub key: String,
    pub entity_name: String,
    pub total: f64,
    /// Name-column value of the first itemized row with this key, whatever its category.
    pub department: Option<String>,
    /// Indices into the itemized table of the rows whose category qualified.
    pub rows: Vec<usize>,
    /// Distinct non-empty category strings, in first-seen order.
    pub initiatives: Vec<String>,
}

impl MatchedGroup {
    pub fn display_name(&self) -> &str {
        self.department.as_deref().unwrap_or(&self.entity_name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One aggregated output row. Amounts stay numeric until the output boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub department: String,
    pub total_spend: f64,
    pub num_rows: usize,
    pub initiatives: String,
    /// (source column, sum) for every detected numeric column.
    pub sums: Vec<(String, f64)>,
}
