use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, SpendError};
use crate::models::Table;

pub struct LoadedTable {
    pub table: Table,
    /// Rows dropped because they could not be decoded or had extra fields.
    pub skipped_rows: usize,
}

/// Read a CSV with a header row. Missing files are fatal; bad rows are skipped.
pub fn load_table(file_path: &Path, role: &str) -> Result<LoadedTable> {
    if !file_path.is_file() {
        return Err(SpendError::MissingInput {
            role: role.to_string(),
            path: file_path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(file_path)?;
    let loaded = read_table(std::io::BufReader::new(file))?;
    tracing::debug!(
        path = %file_path.display(),
        columns = loaded.table.width(),
        rows = loaded.table.len(),
        skipped = loaded.skipped_rows,
        "loaded {role} table"
    );
    Ok(loaded)
}

pub fn read_table<R: std::io::Read>(reader: R) -> Result<LoadedTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = dedupe_headers(rdr.headers()?.iter().map(|h| h.trim().to_string()).collect());
    let width = headers.len();

    let mut rows = Vec::new();
    let mut skipped_rows = 0usize;
    for (i, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row = i + 2, error = %e, "skipping unreadable row");
                skipped_rows += 1;
                continue;
            }
        };
        if record.len() > width {
            tracing::warn!(row = i + 2, fields = record.len(), expected = width, "skipping row with extra fields");
            skipped_rows += 1;
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(LoadedTable {
        table: Table::new(headers, rows),
        skipped_rows,
    })
}

/// Repeated headers get `.1`, `.2`, ... suffixes so every column keeps a
/// distinct name. Blank headers are left alone.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        if header.is_empty() {
            out.push(header);
            continue;
        }
        let mut name = header.clone();
        let mut n = 1;
        while seen.contains(&name) {
            name = format!("{header}.{n}");
            n += 1;
        }
        if name != header {
            tracing::warn!(column = %header, renamed = %name, "duplicate header renamed");
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_trims_headers() {
        let loaded = read_table(" Date , Parks ,Fire\n2020-01-01,1,2\n".as_bytes()).unwrap();
        assert_eq!(loaded.table.headers, vec!["Date", "Parks", "Fire"]);
        assert_eq!(loaded.table.rows, vec![vec!["2020-01-01", "1", "2"]]);
        assert_eq!(loaded.skipped_rows, 0);
    }

    #[test]
    fn test_duplicate_headers_get_suffixes() {
        let content = "Date,Parks,Parks,Fire,Parks,,\nd1,1,2,3,4,5,6\n";
        let loaded = read_table(content.as_bytes()).unwrap();
        assert_eq!(
            loaded.table.headers,
            vec!["Date", "Parks", "Parks.1", "Fire", "Parks.2", "", ""]
        );
        assert_eq!(loaded.table.cell(0, 2), "2");
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let content = "A,A.1,A\n1,2,3\n";
        let loaded = read_table(content.as_bytes()).unwrap();
        assert_eq!(loaded.table.headers, vec!["A", "A.1", "A.2"]);
    }

    #[test]
    fn test_read_table_skips_long_rows_and_pads_short_ones() {
        let content = "\
Department,Initiative,amount
Parks,COVID Response,100
Fire,Grants,1,extra
Library
";
        let loaded = read_table(content.as_bytes()).unwrap();
        assert_eq!(loaded.skipped_rows, 1);
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.table.rows[1], vec!["Library", "", ""]);
    }

    #[test]
    fn test_read_table_skips_invalid_utf8() {
        let mut content = b"Department,amount\nParks,1\n".to_vec();
        content.extend_from_slice(b"\xff\xfe,2\nFire,3\n");
        let loaded = read_table(content.as_slice()).unwrap();
        assert_eq!(loaded.skipped_rows, 1);
        assert_eq!(loaded.table.column(0).collect::<Vec<_>>(), vec!["Parks", "Fire"]);
    }

    #[test]
    fn test_quoted_amounts_survive() {
        let loaded = read_table("Date,Parks\n2020-01-01,\"2,000.00\"\n".as_bytes()).unwrap();
        assert_eq!(loaded.table.cell(0, 1), "2,000.00");
    }

    #[test]
    fn test_load_table_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_table(&dir.path().join("nope.csv"), "Time-series").err().unwrap();
        assert!(matches!(err, SpendError::MissingInput { .. }));
        assert!(err.to_string().starts_with("Time-series file not found"));
    }

    #[test]
    fn test_load_table_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spend.csv");
        std::fs::write(&path, "Date,Parks\n2020-01-01,5\n").unwrap();
        let loaded = load_table(&path, "Time-series").unwrap();
        assert_eq!(loaded.table.width(), 2);
    }
}
