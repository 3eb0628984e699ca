//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::log::LogLevel;

/// Settings needed to open an [`Engine`](crate::Engine).
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use tabula_orm::EngineConfig;
///
/// let config = EngineConfig::from_json(r#"{ "source": "app.db" }"#).unwrap();
/// assert_eq!(config.driver, "sqlite3");
/// assert_eq!(config.source, "app.db");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Driver name, also used to look up the dialect.
    pub driver: String,
    /// Data source, e.g. a file path or `:memory:`.
    pub source: String,
    /// Log level applied on connect.
    pub log_level: LogLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            driver: String::from("sqlite3"),
            source: String::from(":memory:"),
            log_level: LogLevel::default(),
        }
    }
}

impl EngineConfig {
    /// Creates a SQLite configuration for `source`.
    #[must_use]
    pub fn sqlite(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// Parses a configuration from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OrmError::Config`](crate::OrmError::Config) if the document
    /// is not valid.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.driver, "sqlite3");
        assert_eq!(config.source, ":memory:");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json(
            r#"{ "driver": "postgres", "source": "db", "log_level": "error" }"#,
        )
        .unwrap();
        assert_eq!(config.driver, "postgres");
        assert_eq!(config.log_level, LogLevel::Error);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            EngineConfig::from_json("{"),
            Err(OrmError::Config(_))
        ));
    }
}
