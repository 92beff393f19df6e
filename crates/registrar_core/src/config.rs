//! Runtime configuration for registrar entry points.
//!
//! # Responsibility
//! - Resolve database path and logging settings from the environment.
//! - Let callers override any resolved value explicitly.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults, never to errors.
//! - A configured log directory must be absolute.

use crate::logging::{default_log_level, LogTarget};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "REGISTRAR_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "REGISTRAR_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "REGISTRAR_LOG_DIR";

pub const DEFAULT_DB_FILE_NAME: &str = "registrar.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(path) => write!(
                f,
                "{ENV_LOG_DIR} must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrarConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` logs to stderr.
    pub log_dir: Option<PathBuf>,
}

impl Default for RegistrarConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl RegistrarConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir));
            }
            config.log_dir = Some(dir);
        }
        Ok(config)
    }

    pub fn with_db_path(mut self, db_path: impl Into<PathBuf>) -> Self {
        self.db_path = db_path.into();
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn log_target(&self) -> LogTarget {
        match &self.log_dir {
            Some(dir) => LogTarget::Directory(dir.clone()),
            None => LogTarget::Stderr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, RegistrarConfig, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
    use crate::logging::LogTarget;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = RegistrarConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, RegistrarConfig::default());
        assert_eq!(config.log_target(), LogTarget::Stderr);
    }

    #[test]
    fn environment_values_override_defaults() {
        let log_dir = std::env::temp_dir().join("registrar-logs");
        let log_dir_text = log_dir.to_string_lossy().to_string();
        let config = RegistrarConfig::from_lookup(lookup_from(&[
            (ENV_DB_PATH, "/var/lib/registrar/db.sqlite3"),
            (ENV_LOG_LEVEL, "warn"),
            (ENV_LOG_DIR, log_dir_text.as_str()),
        ]))
        .unwrap();

        assert_eq!(config.db_path, PathBuf::from("/var/lib/registrar/db.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_target(), LogTarget::Directory(log_dir));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config =
            RegistrarConfig::from_lookup(lookup_from(&[(ENV_DB_PATH, "  "), (ENV_LOG_DIR, "")]))
                .unwrap();
        assert_eq!(config, RegistrarConfig::default());
    }

    #[test]
    fn relative_log_dir_is_rejected() {
        let err = RegistrarConfig::from_lookup(lookup_from(&[(ENV_LOG_DIR, "logs")])).unwrap_err();
        assert_eq!(err, ConfigError::RelativeLogDir(PathBuf::from("logs")));
    }
}
