use std::io::IsTerminal;
use std::path::PathBuf;

use colored::Colorize;

use crate::aggregator::aggregate;
use crate::cli::{time_series_path, TimeSeriesArgs};
use crate::error::Result;
use crate::fmt::money;
use crate::loader::load_table;
use crate::models::{EntityTotal, Table};
use crate::pager::{paginate, ContinueSignal, KeyPress, NoWait};
use crate::pipeline::ranked_table;
use crate::settings::load_settings;
use crate::writer::write_csv;

/// Ranked list as display strings, amounts as currency.
pub fn display_table(ranked: &[EntityTotal]) -> Table {
    Table::new(
        vec!["Agency".to_string(), "Total_Spend".to_string()],
        ranked
            .iter()
            .map(|t| vec![t.name.clone(), money(t.total)])
            .collect(),
    )
}

pub fn run(input: TimeSeriesArgs, output: Option<String>, no_pager: bool) -> Result<()> {
    let mut settings = load_settings()?;
    input.apply(&mut settings)?;
    let config = &settings.pipeline;

    let loaded = load_table(&time_series_path(&settings), "Time-series")?;
    if loaded.skipped_rows > 0 {
        println!("Skipped {} malformed rows.", loaded.skipped_rows);
    }
    let ranked = aggregate(&loaded.table, &config.date_column, config.threshold_amount);
    let threshold = money(config.threshold_amount);

    if ranked.is_empty() {
        println!("No agencies over {threshold}.");
    } else {
        let mut signal: Box<dyn ContinueSignal> =
            if no_pager || !std::io::stdout().is_terminal() || !std::io::stdin().is_terminal() {
                Box::new(NoWait)
            } else {
                Box::new(KeyPress)
            };
        let mut stdout = std::io::stdout().lock();
        let outcome = paginate(&display_table(&ranked), settings.page_size, signal.as_mut(), &mut stdout)?;
        drop(stdout);
        if outcome.finished {
            println!(
                "\n{}",
                format!("Finished displaying all {} agencies over {threshold}.", ranked.len()).green()
            );
        }
    }

    if let Some(out) = output {
        let written = write_csv(&PathBuf::from(out), &ranked_table(&ranked))?;
        println!("Wrote {} agencies to {}", ranked.len(), written.display());
    }
    Ok(())
}
