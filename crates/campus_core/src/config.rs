//! Runtime configuration read from `CAMPUS_*` environment variables.
//!
//! # Invariants
//! - Blank variables count as unset.
//! - An invalid value fails loading; it never silently falls back.

use crate::logging::{default_log_level, normalize_level};
use crate::model::term::{AcademicTerm, TermError, DEFAULT_ACADEMIC_YEAR, DEFAULT_TERM};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CAMPUS_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CAMPUS_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "CAMPUS_LOG_DIR";
pub const TERM_ENV: &str = "CAMPUS_TERM";
pub const ACADEMIC_YEAR_ENV: &str = "CAMPUS_ACADEMIC_YEAR";

const DEFAULT_DB_FILE_NAME: &str = "campus.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("CAMPUS_LOG_LEVEL: unsupported log level `{0}`")]
    InvalidLogLevel(String),
    #[error("CAMPUS_LOG_DIR: log directory must be absolute, got `{0}`")]
    RelativeLogDir(String),
    #[error("CAMPUS_TERM/CAMPUS_ACADEMIC_YEAR: {0}")]
    InvalidTerm(#[from] TermError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampusConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub term: AcademicTerm,
}

impl CampusConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = read(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));

        let log_level = match read(LOG_LEVEL_ENV) {
            Some(level) => normalize_level(&level).ok_or(ConfigError::InvalidLogLevel(level))?,
            None => default_log_level(),
        };

        let log_dir = match read(LOG_DIR_ENV) {
            Some(dir) => {
                let path = PathBuf::from(&dir);
                if !path.is_absolute() {
                    return Err(ConfigError::RelativeLogDir(dir));
                }
                Some(path)
            }
            None => None,
        };

        let term = AcademicTerm::new(
            read(TERM_ENV).as_deref().unwrap_or(DEFAULT_TERM),
            read(ACADEMIC_YEAR_ENV)
                .as_deref()
                .unwrap_or(DEFAULT_ACADEMIC_YEAR),
        )?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
            term,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CampusConfig, ConfigError, ACADEMIC_YEAR_ENV, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV,
        TERM_ENV,
    };
    use crate::model::term::{AcademicTerm, TermError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(vars: &[(&str, &str)]) -> Result<CampusConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CampusConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert!(config.db_path.ends_with("campus.sqlite3"));
        assert_eq!(config.log_dir, None);
        assert_eq!(config.term, AcademicTerm::default());
    }

    #[test]
    fn explicit_values_are_trimmed_and_used() {
        let log_dir = std::env::temp_dir().join("campus-logs");
        let config = load(&[
            (DB_PATH_ENV, " /var/lib/campus/campus.db "),
            (LOG_LEVEL_ENV, "WARNING"),
            (LOG_DIR_ENV, log_dir.to_str().unwrap()),
            (TERM_ENV, "Term 2"),
            (ACADEMIC_YEAR_ENV, "2026-2027"),
        ])
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/campus/campus.db"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(log_dir));
        assert_eq!(config.term.term(), "Term 2");
        assert_eq!(config.term.academic_year(), "2026-2027");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = load(&[(TERM_ENV, "   "), (LOG_DIR_ENV, "")]).unwrap();
        assert_eq!(config.term.term(), "Term 1");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn invalid_values_fail_loading() {
        assert_eq!(
            load(&[(LOG_LEVEL_ENV, "verbose")]).unwrap_err(),
            ConfigError::InvalidLogLevel("verbose".to_string())
        );
        assert_eq!(
            load(&[(LOG_DIR_ENV, "logs/dev")]).unwrap_err(),
            ConfigError::RelativeLogDir("logs/dev".to_string())
        );
        assert_eq!(
            load(&[(ACADEMIC_YEAR_ENV, "2025")]).unwrap_err(),
            ConfigError::InvalidTerm(TermError::MalformedAcademicYear("2025".to_string()))
        );
    }
}
