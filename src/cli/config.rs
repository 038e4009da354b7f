use crate::cli::{category_override, parse_match_type, ConfigCommands};
use crate::error::{Result, SpendError};
use crate::settings::{load_settings, save_settings, settings_path, Settings};

pub fn dispatch(cmd: ConfigCommands) -> Result<()> {
    match cmd {
        ConfigCommands::Show => show(),
        ConfigCommands::Path => {
            println!("{}", settings_path().display());
            Ok(())
        }
        ConfigCommands::Reset => {
            save_settings(&Settings::default())?;
            println!("Settings reset to defaults.");
            Ok(())
        }
        ConfigCommands::Set {
            time_series,
            initiatives,
            output_dir,
            threshold,
            phrase,
            match_type,
            page_size,
            placeholders,
            detailed,
            category_header,
            category_position,
        } => {
            let mut s = load_settings()?;
            if let Some(v) = time_series {
                s.time_series_path = v;
            }
            if let Some(v) = initiatives {
                s.initiatives_path = v;
            }
            if let Some(v) = output_dir {
                s.output_dir = v;
            }
            if let Some(v) = threshold {
                if !v.is_finite() {
                    return Err(SpendError::Settings(format!("invalid threshold: {v}")));
                }
                s.pipeline.threshold_amount = v;
            }
            if let Some(v) = phrase {
                s.pipeline.category_phrase = v;
            }
            if let Some(v) = match_type {
                s.pipeline.match_type = parse_match_type(&v)?;
            }
            if let Some(v) = page_size {
                if v == 0 {
                    return Err(SpendError::Settings("page size must be at least 1".into()));
                }
                s.page_size = v;
            }
            if let Some(v) = placeholders {
                s.pipeline.include_unmatched_placeholders = v;
            }
            if let Some(v) = detailed {
                s.pipeline.emit_detailed_rows = v;
            }
            if let Some(c) = category_override(category_header, category_position) {
                s.pipeline.category_column = c;
            }
            save_settings(&s)?;
            println!("Saved {}", settings_path().display());
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let settings = load_settings()?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
