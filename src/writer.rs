use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Result, SpendError};
use crate::models::Table;

/// `<stem>_<YYYYmmdd_HHMMSS>.<ext>` next to `path`.
pub fn timestamped_path(path: &Path, stamp: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{stamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{stamp}"),
    };
    path.with_file_name(name)
}

fn write_to(path: &Path, table: &Table) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn is_permission_denied(err: &SpendError) -> bool {
    match err {
        SpendError::Io(e) => e.kind() == ErrorKind::PermissionDenied,
        SpendError::Csv(e) => matches!(e.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::PermissionDenied),
        _ => false,
    }
}

/// Write `table` as CSV. If the destination is locked or read-only, write to a
/// timestamped sibling instead. Returns the path actually written.
pub fn write_csv(path: &Path, table: &Table) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    match write_to(path, table) {
        Ok(()) => {
            tracing::info!(path = %path.display(), rows = table.len(), "wrote csv");
            Ok(path.to_path_buf())
        }
        Err(e) => {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            write_after_failure(path, table, e, &stamp)
        }
    }
}

/// Retry a failed write at `<stem>_<stamp>.<ext>` when the failure was a
/// permission problem; any other error is returned unchanged.
fn write_after_failure(path: &Path, table: &Table, err: SpendError, stamp: &str) -> Result<PathBuf> {
    if !is_permission_denied(&err) {
        return Err(err);
    }
    let alt = timestamped_path(path, stamp);
    tracing::warn!(
        path = %path.display(),
        fallback = %alt.display(),
        "permission denied, writing to fallback path"
    );
    write_to(&alt, table)?;
    Ok(alt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["Agency".into(), "Total_Spend".into()],
            vec![vec!["Parks, NYC".into(), "2000000.00".into()]],
        )
    }

    #[test]
    fn test_timestamped_path() {
        let p = timestamped_path(Path::new("/tmp/out/matched.csv"), "20250101_120000");
        assert_eq!(p, PathBuf::from("/tmp/out/matched_20250101_120000.csv"));
        let p = timestamped_path(Path::new("report"), "x");
        assert_eq!(p, PathBuf::from("report_x"));
    }

    #[test]
    fn test_write_csv_creates_parent_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ranked.csv");
        let written = write_csv(&path, &sample()).unwrap();
        assert_eq!(written, path);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Agency,Total_Spend\n\"Parks, NYC\",2000000.00\n");
    }

    #[test]
    fn test_write_csv_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked.csv");
        std::fs::write(&path, "stale\n").unwrap();
        write_csv(&path, &sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("Agency,Total_Spend"));
    }

    #[test]
    fn test_permission_denied_writes_timestamped_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matched.csv");
        std::fs::write(&path, "previous\n").unwrap();

        let denied = SpendError::Io(std::io::Error::new(ErrorKind::PermissionDenied, "locked"));
        let written = write_after_failure(&path, &sample(), denied, "20250101_120000").unwrap();

        assert_eq!(written, dir.path().join("matched_20250101_120000.csv"));
        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.starts_with("Agency,Total_Spend"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "previous\n");
    }

    #[test]
    fn test_permission_denied_inside_csv_error_is_recognized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked.csv");
        let io = std::io::Error::new(ErrorKind::PermissionDenied, "locked");
        let denied = SpendError::Csv(csv::Error::from(io));
        let written = write_after_failure(&path, &sample(), denied, "x").unwrap();
        assert_eq!(written, dir.path().join("ranked_x.csv"));
    }

    #[test]
    fn test_other_write_errors_are_not_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranked.csv");
        let other = SpendError::Io(std::io::Error::new(ErrorKind::Other, "disk full"));
        let err = write_after_failure(&path, &sample(), other, "x").unwrap_err();
        assert!(matches!(err, SpendError::Io(e) if e.kind() == ErrorKind::Other));
        assert!(!dir.path().join("ranked_x.csv").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_csv_falls_back_on_permission_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.csv");
        std::fs::write(&path, "locked\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o444)).unwrap();

        // root bypasses the read-only bit
        if std::fs::OpenOptions::new().write(true).open(&path).is_ok() {
            return;
        }

        let written = write_csv(&path, &sample()).unwrap();
        assert_ne!(written, path);
        let name = written.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("locked_") && name.ends_with(".csv"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "locked\n");
    }
}
