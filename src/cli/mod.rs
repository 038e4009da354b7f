pub mod completions;
pub mod config;
pub mod diagnose;
pub mod report;
pub mod totals;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::columns::CategoryColumn;
use crate::error::{Result, SpendError};
use crate::matcher::MatchType;
use crate::settings::{shellexpand_path, Settings};

#[derive(Parser)]
#[command(
    name = "spendcross",
    version,
    about = "Cross-reference high-spend agencies against COVID response initiatives."
)]
pub struct Cli {
    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank agencies whose total spend is over the threshold.
    Totals {
        #[command(flatten)]
        input: TimeSeriesArgs,
        /// Also write the ranked list to this CSV file
        #[arg(long)]
        output: Option<String>,
        /// Print every page without waiting for a key
        #[arg(long = "no-pager")]
        no_pager: bool,
    },
    /// Match over-threshold agencies to initiatives and write the aggregated summary.
    Report {
        #[command(flatten)]
        input: TimeSeriesArgs,
        #[command(flatten)]
        matching: MatchArgs,
        /// Directory for output CSV files
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        /// Keep a zero row for agencies without qualifying initiatives
        #[arg(long)]
        placeholders: bool,
        /// Also write every qualifying initiative row
        #[arg(long)]
        detailed: bool,
        /// Print the summary without writing the aggregated CSV
        #[arg(long = "no-write")]
        no_write: bool,
    },
    /// Show how many names line up between the two files after normalization.
    Diagnose {
        #[command(flatten)]
        input: TimeSeriesArgs,
        /// Itemized initiatives CSV
        #[arg(long)]
        initiatives: Option<String>,
        /// How many sample names to list per section
        #[arg(long, default_value = "20")]
        samples: usize,
    },
    /// Show or change saved settings.
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Clone, Default)]
pub struct TimeSeriesArgs {
    /// Time-series CSV: a date column plus one column per agency
    #[arg(long = "time-series")]
    pub time_series: Option<String>,
    /// Only agencies with total spend strictly above this amount (may be negative)
    #[arg(long, allow_hyphen_values = true)]
    pub threshold: Option<f64>,
    /// Header of the date column in the time-series file
    #[arg(long = "date-column")]
    pub date_column: Option<String>,
}

#[derive(Args, Clone, Default)]
pub struct MatchArgs {
    /// Itemized initiatives CSV
    #[arg(long)]
    pub initiatives: Option<String>,
    /// Phrase the category column must contain (case-insensitive)
    #[arg(long)]
    pub phrase: Option<String>,
    /// Treat --phrase as a regular expression
    #[arg(long)]
    pub regex: bool,
    /// Preferred department column header; repeat to give several in priority order
    #[arg(long = "name-column")]
    pub name_columns: Vec<String>,
    /// Locate the category column by header instead of position
    #[arg(long = "category-header", conflicts_with = "category_position")]
    pub category_header: Option<String>,
    /// Zero-based position of the category column
    #[arg(long = "category-position")]
    pub category_position: Option<usize>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings as JSON.
    Show,
    /// Print the settings file location.
    Path,
    /// Update saved settings.
    Set {
        #[arg(long = "time-series")]
        time_series: Option<String>,
        #[arg(long)]
        initiatives: Option<String>,
        #[arg(long = "output-dir")]
        output_dir: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<f64>,
        #[arg(long)]
        phrase: Option<String>,
        /// contains or regex
        #[arg(long = "match-type")]
        match_type: Option<String>,
        #[arg(long = "page-size")]
        page_size: Option<usize>,
        #[arg(long)]
        placeholders: Option<bool>,
        #[arg(long)]
        detailed: Option<bool>,
        #[arg(long = "category-header", conflicts_with = "category_position")]
        category_header: Option<String>,
        #[arg(long = "category-position")]
        category_position: Option<usize>,
    },
    /// Restore default settings.
    Reset,
}

pub(crate) fn parse_match_type(raw: &str) -> Result<MatchType> {
    match raw.to_ascii_lowercase().as_str() {
        "contains" => Ok(MatchType::Contains),
        "regex" => Ok(MatchType::Regex),
        other => Err(SpendError::Other(format!(
            "unknown match type {other:?} (expected contains or regex)"
        ))),
    }
}

pub(crate) fn category_override(
    header: Option<String>,
    position: Option<usize>,
) -> Option<CategoryColumn> {
    match (header, position) {
        (Some(h), _) => Some(CategoryColumn::Header(vec![h])),
        (None, Some(p)) => Some(CategoryColumn::Position(p)),
        (None, None) => None,
    }
}

impl TimeSeriesArgs {
    /// Fold command-line overrides into saved settings.
    pub fn apply(&self, settings: &mut Settings) -> Result<()> {
        if let Some(p) = &self.time_series {
            settings.time_series_path = p.clone();
        }
        if let Some(t) = self.threshold {
            if !t.is_finite() {
                return Err(SpendError::Other(format!("invalid threshold: {t}")));
            }
            settings.pipeline.threshold_amount = t;
        }
        if let Some(d) = &self.date_column {
            settings.pipeline.date_column = d.clone();
        }
        Ok(())
    }
}

impl MatchArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(p) = &self.initiatives {
            settings.initiatives_path = p.clone();
        }
        if let Some(p) = &self.phrase {
            settings.pipeline.category_phrase = p.clone();
        }
        if self.regex {
            settings.pipeline.match_type = MatchType::Regex;
        }
        if !self.name_columns.is_empty() {
            settings.pipeline.name_columns = self.name_columns.clone();
        }
        if let Some(c) = category_override(self.category_header.clone(), self.category_position) {
            settings.pipeline.category_column = c;
        }
    }
}

pub(crate) fn time_series_path(settings: &Settings) -> PathBuf {
    shellexpand_path(&settings.time_series_path)
}

pub(crate) fn initiatives_path(settings: &Settings) -> PathBuf {
    shellexpand_path(&settings.initiatives_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_apply_on_top_of_settings() {
        let mut settings = Settings::default();
        let ts = TimeSeriesArgs {
            time_series: Some("a.csv".into()),
            threshold: Some(10.0),
            date_column: None,
        };
        ts.apply(&mut settings).unwrap();
        let m = MatchArgs {
            phrase: Some("pandemic".into()),
            regex: true,
            category_header: Some("Initiative Category".into()),
            ..MatchArgs::default()
        };
        m.apply(&mut settings);
        assert_eq!(settings.time_series_path, "a.csv");
        assert_eq!(settings.pipeline.threshold_amount, 10.0);
        assert_eq!(settings.pipeline.date_column, "Date");
        assert_eq!(settings.pipeline.category_phrase, "pandemic");
        assert_eq!(settings.pipeline.match_type, MatchType::Regex);
        assert_eq!(
            settings.pipeline.category_column,
            CategoryColumn::Header(vec!["Initiative Category".into()])
        );
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        let mut settings = Settings::default();
        let ts = TimeSeriesArgs {
            threshold: Some(f64::NAN),
            ..TimeSeriesArgs::default()
        };
        assert!(ts.apply(&mut settings).is_err());
    }

    #[test]
    fn test_negative_threshold_parses() {
        let cli = Cli::try_parse_from(["spendcross", "totals", "--threshold", "-1", "--no-pager"]).unwrap();
        match cli.command {
            Commands::Totals { input, no_pager, .. } => {
                assert_eq!(input.threshold, Some(-1.0));
                assert!(no_pager);
            }
            _ => panic!("expected totals"),
        }

        let cli = Cli::try_parse_from(["spendcross", "config", "set", "--threshold", "-2.5"]).unwrap();
        match cli.command {
            Commands::Config {
                command: ConfigCommands::Set { threshold, .. },
            } => assert_eq!(threshold, Some(-2.5)),
            _ => panic!("expected config set"),
        }
    }

    #[test]
    fn test_parse_match_type() {
        assert_eq!(parse_match_type("Regex").unwrap(), MatchType::Regex);
        assert_eq!(parse_match_type("contains").unwrap(), MatchType::Contains);
        assert!(parse_match_type("fuzzy").is_err());
    }
}
