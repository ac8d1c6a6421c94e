//! # Settings Loader
//!
//! Loads the tracker's `settings.json`: currency symbol used in summaries, how many
//! problem rows an ingestion report lists, how many recent transactions a summary
//! shows, and the file prefix for exported workbooks.
//!
//! Every field has a default, so a partial file (or no file at all) is fine.
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//!
//! let settings = settings_loader::load_settings("config/settings.json")?;
//!
//! let path = Some(PathBuf::from("my_settings.json"));
//! let settings = settings_loader::load_settings_or_default(path.as_ref())?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::Settings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Loads settings from a JSON file
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading settings file: {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&raw)
        .with_context(|| format!("Parsing settings JSON in {}", path.display()))?;
    Ok(settings)
}

/// Loads settings from the default location (settings.json in the current directory)
pub fn load_default_settings() -> Result<Settings> {
    load_settings(DEFAULT_SETTINGS_FILE)
}

/// Loads settings from an optional path, returning None if no path is provided
pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<Settings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}

/// An explicit path must load; its errors are returned. Without one, the
/// default `settings.json` is read if it exists, otherwise built-in defaults
/// are used.
pub fn load_settings_or_default(path: Option<&PathBuf>) -> Result<Settings> {
    if let Some(settings) = load_optional_settings(path)? {
        return Ok(settings);
    }
    if settings_file_exists(DEFAULT_SETTINGS_FILE) {
        return load_default_settings();
    }
    Ok(Settings::default())
}

/// Checks if a settings file exists at the given path
pub fn settings_file_exists<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref().exists() && path.as_ref().is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_settings_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"currency_symbol": "€", "problem_rows_shown": 3}}"#).unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(settings.problem_rows_shown, 3);
        assert_eq!(settings.recent_transactions_shown, 10);
    }

    #[test]
    fn test_load_settings_rejects_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let err = load_settings(file.path()).unwrap_err();
        assert!(err.to_string().contains("Parsing settings JSON"));
    }

    #[test]
    fn test_load_optional_settings_none() {
        assert!(load_optional_settings(None).unwrap().is_none());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(!settings_file_exists(&missing));

        let err = load_settings_or_default(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_explicit_malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"currency_symbol": 5"#).unwrap();
        let path = file.path().to_path_buf();

        let err = load_settings_or_default(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Parsing settings JSON"));
    }

    #[test]
    fn test_explicit_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"export_file_prefix": "finanzas"}}"#).unwrap();
        let path = file.path().to_path_buf();

        let settings = load_settings_or_default(Some(&path)).unwrap();
        assert_eq!(settings.export_file_prefix, "finanzas");
        assert_eq!(settings.currency_symbol, "$");
    }
}
