use std::path::PathBuf;

use colored::Colorize;
use comfy_table::Table as TextTable;

use crate::cli::{initiatives_path, time_series_path, MatchArgs, TimeSeriesArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::loader::load_table;
use crate::pipeline::{self, format_summary, ranked_table, CovidReport};
use crate::settings::{load_settings, shellexpand_path};
use crate::writer::write_csv;

pub const RANKED_FILE: &str = "ranked_agencies.csv";
pub const AGGREGATED_FILE: &str = "matched_covid_aggregated.csv";
pub const DETAILED_FILE: &str = "matched_covid_rows.csv";

pub struct ReportOptions {
    pub output_dir: Option<String>,
    pub placeholders: bool,
    pub detailed: bool,
    pub no_write: bool,
}

pub fn format_report(report: &CovidReport, threshold: f64) -> String {
    let mut out = String::new();

    if let Some(col) = &report.name_column {
        if col.via_fallback {
            out.push_str(&format!(
                "{}\n",
                format!("No department column found; matching on first column {:?}.", col.header).yellow()
            ));
        }
    }

    match &report.category_column {
        None => out.push_str(&format!(
            "{}\n",
            "No category column found; no initiative rows can qualify.".yellow()
        )),
        Some(col) if col.via_fallback => out.push_str(&format!(
            "{}\n",
            format!("Category header not found; using column {:?}.", col.header).yellow()
        )),
        Some(_) => {}
    }

    out.push_str(&format!(
        "Target agencies (over {}): {}\n",
        money(threshold),
        report.target_count()
    ));
    out.push_str(&format!(
        "Departments with matching initiatives: {}\n",
        report.matched_count()
    ));
    let unmatched = report.unmatched_keys();
    if !unmatched.is_empty() {
        tracing::info!(keys = ?unmatched, "agencies without qualifying initiatives");
        out.push_str(&format!(
            "Agencies without matching initiatives: {}\n",
            unmatched.len()
        ));
    }

    let formatted = format_summary(report);
    if formatted.rows.is_empty() {
        out.push_str("\nNo matching initiatives found.");
        return out;
    }

    let mut table = TextTable::new();
    table.set_header(formatted.headers.clone());
    for row in &formatted.rows {
        table.add_row(row.clone());
    }
    out.push_str(&format!("\n{}\n{table}", "Aggregated Summary".bold()));
    out
}

pub fn run(input: TimeSeriesArgs, matching: MatchArgs, opts: ReportOptions) -> Result<()> {
    let mut settings = load_settings()?;
    input.apply(&mut settings)?;
    matching.apply(&mut settings);
    if let Some(dir) = opts.output_dir {
        settings.output_dir = dir;
    }
    if opts.placeholders {
        settings.pipeline.include_unmatched_placeholders = true;
    }
    if opts.detailed {
        settings.pipeline.emit_detailed_rows = true;
    }
    if opts.no_write {
        settings.write_aggregated = false;
    }

    let spending = load_table(&time_series_path(&settings), "Time-series")?;
    let initiatives = load_table(&initiatives_path(&settings), "Initiatives")?;
    let skipped = spending.skipped_rows + initiatives.skipped_rows;
    if skipped > 0 {
        println!("Skipped {skipped} malformed rows.");
    }

    let report = pipeline::run(&spending.table, &initiatives.table, &settings.pipeline)?;
    let out_dir: PathBuf = shellexpand_path(&settings.output_dir);

    let ranked = ranked_table(&report.ranked);
    let written = write_csv(&out_dir.join(RANKED_FILE), &ranked)?;
    println!("Wrote {} ranked agencies to {}", ranked.len(), written.display());

    if let Some(detailed) = &report.detailed {
        let written = write_csv(&out_dir.join(DETAILED_FILE), detailed)?;
        println!("Wrote {} detailed rows to {}", detailed.len(), written.display());
    }
    if settings.write_aggregated {
        let summary = format_summary(&report);
        let written = write_csv(&out_dir.join(AGGREGATED_FILE), &summary)?;
        println!("Wrote {} aggregated rows to {}", summary.len(), written.display());
    }

    println!("{}", format_report(&report, settings.pipeline.threshold_amount));
    Ok(())
}
