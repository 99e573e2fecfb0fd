//! Application configuration.
//!
//! Constants shared by the engine and the HTTP layer, plus the
//! environment-driven [`AppConfig`] used by the CLI.

use std::env;

/// Rows shown per page when nothing else is configured.
pub const DEFAULT_ROWS_PER_PAGE: usize = 10;

/// HTTP port for `tablekit serve`.
pub const DEFAULT_PORT: u16 = 3000;

/// MIME type of exported CSV.
pub const CSV_MIME_TYPE: &str = "text/csv; charset=utf-8";

/// Prefix of the suggested export filename.
pub const EXPORT_FILE_PREFIX: &str = "table-data";

/// Maximum file size for import (in bytes).
///
/// 50 MB limit.
pub const MAX_IMPORT_SIZE: usize = 50 * 1024 * 1024;

/// Maximum import errors echoed to the log.
pub const MAX_REPORTED_ERRORS: usize = 10;

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `TABLEKIT_PORT`
    pub port: u16,
    /// `TABLEKIT_ROWS_PER_PAGE`
    pub rows_per_page: usize,
    /// `TABLEKIT_SEED`: start the session with the sample data set.
    pub seed: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            seed: true,
        }
    }
}

impl AppConfig {
    /// Load from process environment. Unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("TABLEKIT_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            rows_per_page: lookup("TABLEKIT_ROWS_PER_PAGE")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.rows_per_page),
            seed: lookup("TABLEKIT_SEED")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.seed),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.rows_per_page, 10);
    }

    #[test]
    fn test_env_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TABLEKIT_PORT", "8080"),
            ("TABLEKIT_ROWS_PER_PAGE", " 25 "),
            ("TABLEKIT_SEED", "off"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rows_per_page, 25);
        assert!(!config.seed);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AppConfig::from_lookup(lookup(&[
            ("TABLEKIT_PORT", "http"),
            ("TABLEKIT_ROWS_PER_PAGE", "0"),
            ("TABLEKIT_SEED", "maybe"),
        ]));
        assert_eq!(config, AppConfig::default());
    }
}
