use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{initiatives_path, time_series_path, TimeSeriesArgs};
use crate::diagnostics::{diagnose, MatchDiagnostics};
use crate::error::Result;
use crate::fmt::money;
use crate::loader::load_table;
use crate::settings::load_settings;

fn section(out: &mut String, title: &str, names: &[String]) {
    out.push_str(&format!("\n{}\n", title.bold()));
    if names.is_empty() {
        out.push_str("  (none)\n");
    }
    for (i, name) in names.iter().enumerate() {
        out.push_str(&format!("{:>3}. {name}\n", i + 1));
    }
}

pub fn format_diagnostics(d: &MatchDiagnostics) -> String {
    let mut out = String::new();
    match &d.name_column {
        Some(col) if col.via_fallback => out.push_str(&format!(
            "Name column: {} {}\n",
            col.header,
            "(guessed: first column)".yellow()
        )),
        Some(col) => out.push_str(&format!("Name column: {}\n", col.header)),
        None => out.push_str(&format!("{}\n", "Initiative file has no columns.".red())),
    }

    out.push_str(&format!("Unique agency names:     {}\n", d.agency_keys));
    out.push_str(&format!("Unique department names: {}\n", d.department_keys));
    out.push_str(&format!("Exact matches:           {}\n", d.intersection_size));

    section(&mut out, "Matched names", &d.intersection);
    section(&mut out, "Agencies with no department", &d.only_agencies);
    section(&mut out, "Departments with no agency", &d.only_departments);

    if !d.top_agencies.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Agency", "Total Spend"]);
        for t in &d.top_agencies {
            table.add_row(vec![Cell::new(&t.name), Cell::new(money(t.total))]);
        }
        out.push_str(&format!("\n{}\n{table}", "Top agencies over threshold".bold()));
    }
    out
}

pub fn run(input: TimeSeriesArgs, initiatives: Option<String>, samples: usize) -> Result<()> {
    let mut settings = load_settings()?;
    input.apply(&mut settings)?;
    if let Some(p) = initiatives {
        settings.initiatives_path = p;
    }

    let spending = load_table(&time_series_path(&settings), "Time-series")?;
    let items = load_table(&initiatives_path(&settings), "Initiatives")?;

    let d = diagnose(
        &spending.table,
        &items.table,
        &settings.pipeline.date_column,
        settings.pipeline.threshold_amount,
        samples,
    );
    println!("{}", format_diagnostics(&d));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table as DataTable;

    #[test]
    fn test_format_diagnostics_sections() {
        let spending = DataTable::new(
            vec!["Date".into(), "Parks".into()],
            vec![vec!["d1".into(), "2000000".into()]],
        );
        let items = DataTable::new(
            vec!["Org".into(), "Initiative".into()],
            vec![vec!["Fire".into(), "x".into()]],
        );
        let d = diagnose(&spending, &items, "Date", 1_000_000.0, 20);
        let text = format_diagnostics(&d);
        assert!(text.contains("Name column: Org"));
        assert!(text.contains("Exact matches:           0"));
        assert!(text.contains("  1. parks"));
        assert!(text.contains("  1. fire"));
        assert!(text.contains("(none)"));
        assert!(text.contains("$2,000,000.00"));
    }
}
