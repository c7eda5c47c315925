//! Application settings
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. Built-in defaults
//! 2. An optional TOML file (`~/.local/share/moneywise/config.toml` or an
//!    explicit path)
//! 3. Environment variables (`MONEYWISE_DB`, `MONEYWISE_LOG_LEVEL`,
//!    `MONEYWISE_CURRENCY`)
//!
//! ```toml
//! database_path = "/var/lib/moneywise/moneywise.db"
//! log_level = "debug"
//! currency = "KZT"
//! recent_limit = 10
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable overriding the database path
pub const DB_ENV: &str = "MONEYWISE_DB";
/// Environment variable overriding the log level
pub const LOG_LEVEL_ENV: &str = "MONEYWISE_LOG_LEVEL";
/// Environment variable overriding the currency label
pub const CURRENCY_ENV: &str = "MONEYWISE_CURRENCY";

const APP_DIR: &str = "moneywise";
const DEFAULT_RECENT_LIMIT: usize = 10;
const MAX_RECENT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub log_level: String,
    /// Label appended to amounts in messages; none means bare numbers
    pub currency: Option<String>,
    /// How many expenses the "recent" report lists
    pub recent_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: "info".to_string(),
            currency: None,
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

/// File layout; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    database_path: Option<PathBuf>,
    log_level: Option<String>,
    currency: Option<String>,
    recent_limit: Option<usize>,
}

/// Default settings file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// Default database file location, falling back to the working directory
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("moneywise.db"))
        .unwrap_or_else(|| PathBuf::from("moneywise.db"))
}

impl Settings {
    /// Load settings from `path` (or the default location) and the environment
    ///
    /// An explicit path must exist; a missing default file is fine.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!("Loaded settings from {}", path.display());
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawSettings = toml::from_str(content)?;
        let mut settings = Self::default();

        if let Some(path) = raw.database_path {
            settings.database_path = path;
        }
        if let Some(level) = raw.log_level {
            settings.log_level = level;
        }
        settings.currency = non_blank(raw.currency);
        if let Some(limit) = raw.recent_limit {
            settings.recent_limit = validate_recent_limit(limit)?;
        }
        Ok(settings)
    }

    /// Override fields from environment variables read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = non_blank(lookup(DB_ENV)) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(lookup(LOG_LEVEL_ENV)) {
            self.log_level = level;
        }
        if let Some(currency) = lookup(CURRENCY_ENV) {
            // An empty value switches the label off
            self.currency = non_blank(Some(currency));
        }
        Ok(())
    }

    /// Create the database's parent directory if needed
    pub fn ensure_database_dir(&self) -> Result<()> {
        if let Some(parent) = self.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

fn validate_recent_limit(limit: usize) -> Result<usize> {
    if limit == 0 || limit > MAX_RECENT_LIMIT {
        return Err(Error::Config(format!(
            "recent_limit must be between 1 and {}, got {}",
            MAX_RECENT_LIMIT, limit
        )));
    }
    Ok(limit)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.currency, None);
        assert_eq!(settings.recent_limit, 10);
        assert!(settings.database_path.ends_with("moneywise.db"));
    }

    #[test]
    fn test_from_toml() {
        let settings = Settings::from_toml(
            r#"
            database_path = "/tmp/mw.db"
            currency = "KZT"
            recent_limit = 5
            "#,
        )
        .unwrap();
        assert_eq!(settings.database_path, PathBuf::from("/tmp/mw.db"));
        assert_eq!(settings.currency.as_deref(), Some("KZT"));
        assert_eq!(settings.recent_limit, 5);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Settings::from_toml("recent_limit = \"many\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("colour = \"blue\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Settings::from_toml("recent_limit = 0"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut settings = Settings::from_toml("currency = \"KZT\"\nlog_level = \"warn\"").unwrap();
        let env: HashMap<&str, &str> = [(DB_ENV, "/data/mw.db"), (LOG_LEVEL_ENV, "debug")]
            .into_iter()
            .collect();
        settings
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.database_path, PathBuf::from("/data/mw.db"));
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.currency.as_deref(), Some("KZT"));
    }

    #[test]
    fn test_empty_currency_env_disables_label() {
        let mut settings = Settings::from_toml("currency = \"KZT\"").unwrap();
        settings
            .apply_env(|key| (key == CURRENCY_ENV).then(String::new))
            .unwrap();
        assert_eq!(settings.currency, None);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "recent_limit = 3").unwrap();
        assert_eq!(Settings::from_file(&path).unwrap().recent_limit, 3);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(Settings::from_file(&missing), Err(Error::Config(_))));
    }
}
