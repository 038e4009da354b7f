use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpendError};
use crate::pager::DEFAULT_PAGE_SIZE;
use crate::pipeline::PipelineConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_time_series_path")]
    pub time_series_path: String,
    #[serde(default = "default_initiatives_path")]
    pub initiatives_path: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_true")]
    pub write_aggregated: bool,
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

fn default_time_series_path() -> String {
    "spending_by_date.csv".to_string()
}

fn default_initiatives_path() -> String {
    "Department Spending.csv".to_string()
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_series_path: default_time_series_path(),
            initiatives_path: default_initiatives_path(),
            output_dir: default_output_dir(),
            page_size: default_page_size(),
            write_aggregated: true,
            pipeline: PipelineConfig::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("spendcross")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Settings from disk, or defaults when the file is missing.
pub fn load_settings() -> Result<Settings> {
    let path = settings_path();
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(&path)?;
    parse_settings(&content)
        .map_err(|e| SpendError::Settings(format!("{}: {e}", path.display())))
}

pub fn parse_settings(content: &str) -> std::result::Result<Settings, serde_json::Error> {
    serde_json::from_str(content)
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches('/'));
        }
    }
    PathBuf::from(path)
}
