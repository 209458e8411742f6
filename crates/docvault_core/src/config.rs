//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank variables behave as if unset.
//! - `log_dir`, when present, is kept verbatim; `init_logging` validates it.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "DOCVAULT_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "DOCVAULT_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "DOCVAULT_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "docvault.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: String,
    /// File logging stays off when unset.
    pub log_dir: Option<String>,
}

impl CoreConfig {
    /// Reads configuration from `DOCVAULT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: non_blank(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(default_db_path),
            log_level: non_blank(LOG_LEVEL_ENV)
                .unwrap_or_else(|| default_log_level().to_string()),
            log_dir: non_blank(LOG_DIR_ENV),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, DB_PATH_ENV, LOG_DIR_ENV, LOG_LEVEL_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let env = HashMap::from([(DB_PATH_ENV, "   "), (LOG_LEVEL_ENV, "")]);
        let config = CoreConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config, CoreConfig::default());
        assert!(config.db_path.ends_with("docvault.sqlite3"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn explicit_values_are_trimmed_and_kept() {
        let env = HashMap::from([
            (DB_PATH_ENV, " /srv/docvault/main.sqlite3 "),
            (LOG_LEVEL_ENV, "warn"),
            (LOG_DIR_ENV, "/var/log/docvault"),
        ]);
        let config = CoreConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.db_path, PathBuf::from("/srv/docvault/main.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/docvault"));
    }
}
