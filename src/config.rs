use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{
    DEFAULT_PAGE_SIZE, DEFAULT_RECYCLE_RETENTION_DAYS, MAX_RECYCLE_RETENTION_DAYS,
};
use crate::error::ConfigError;

fn default_data_dir() -> PathBuf {
    PathBuf::from("tmp")
}

fn default_database_name() -> String {
    "records".to_string()
}

fn default_recycle_retention_days() -> i64 {
    DEFAULT_RECYCLE_RETENTION_DAYS
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

/// Application configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the SQLite database (default: tmp)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory holding the audio files (default: <data_dir>/records)
    pub records_dir: Option<PathBuf>,
    /// Database file name without extension (default: records)
    #[serde(default = "default_database_name")]
    pub database_name: String,
    /// Days a recycled record is kept before purge deletes it (default: 30)
    #[serde(default = "default_recycle_retention_days")]
    pub recycle_retention_days: i64,
    /// Records per listing page (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            records_dir: None,
            database_name: default_database_name(),
            recycle_retention_days: default_recycle_retention_days(),
            page_size: default_page_size(),
        }
    }
}

impl AppConfig {
    /// Read and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_name.trim().is_empty() || self.database_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "database_name {:?} is not a plain file name",
                self.database_name
            )));
        }
        if !(0..=MAX_RECYCLE_RETENTION_DAYS).contains(&self.recycle_retention_days) {
            return Err(ConfigError::Invalid(format!(
                "recycle_retention_days must be between 0 and {}",
                MAX_RECYCLE_RETENTION_DAYS
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Millisecond timestamp before which recycled records are purged
    pub fn recycle_cutoff_ms(&self, now: DateTime<Utc>) -> Result<i64, ConfigError> {
        TimeDelta::try_days(self.recycle_retention_days)
            .and_then(|retention| now.checked_sub_signed(retention))
            .map(|cutoff| cutoff.timestamp_millis())
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "recycle_retention_days {} is out of range",
                    self.recycle_retention_days
                ))
            })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.sqlite", self.database_name))
    }

    pub fn records_dir(&self) -> PathBuf {
        self.records_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("records"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<AppConfig, ConfigError> {
        AppConfig::parse(content, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.database_path(), PathBuf::from("tmp/records.sqlite"));
        assert_eq!(config.records_dir(), PathBuf::from("tmp/records"));
        assert_eq!(config.recycle_retention_days, 30);
        assert_eq!(config.page_size, 50);
    }

    #[test]
    fn test_explicit_values() {
        let config = parse(
            r#"
            data_dir = "/var/lib/clips"
            records_dir = "/srv/audio"
            database_name = "library"
            recycle_retention_days = 7
            page_size = 20
            "#,
        )
        .unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/clips/library.sqlite")
        );
        assert_eq!(config.records_dir(), PathBuf::from("/srv/audio"));
        assert_eq!(config.recycle_retention_days, 7);
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            parse("page_size = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("recycle_retention_days = -1"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("recycle_retention_days = 9223372036854775807"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse("database_name = \"a/b\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(parse("page_size = \"x\""), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_recycle_cutoff() {
        let now = DateTime::from_timestamp_millis(1_700_000_000_000).unwrap();
        let config = parse("recycle_retention_days = 2").unwrap();
        assert_eq!(
            config.recycle_cutoff_ms(now).unwrap(),
            1_700_000_000_000 - 2 * 86_400_000
        );

        // Bypasses validate, as a struct literal would
        let huge = AppConfig {
            recycle_retention_days: i64::MAX,
            ..AppConfig::default()
        };
        assert!(matches!(
            huge.recycle_cutoff_ms(now),
            Err(ConfigError::Invalid(_))
        ));
    }
}
