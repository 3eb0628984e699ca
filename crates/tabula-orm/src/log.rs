//! Log level control.
//!
//! The ORM logs through `tracing`. [`set_level`] installs a formatting
//! subscriber on first use and adjusts its level afterwards. If the
//! application already installed its own subscriber, that one wins and
//! `set_level` does nothing.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

/// Verbosity of the ORM's own subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Statements, lifecycle events and errors.
    #[default]
    Info,
    /// Errors only.
    Error,
    /// Nothing.
    Disabled,
}

impl LogLevel {
    const fn filter(self) -> LevelFilter {
        match self {
            Self::Info => LevelFilter::INFO,
            Self::Error => LevelFilter::ERROR,
            Self::Disabled => LevelFilter::OFF,
        }
    }
}

static HANDLE: OnceLock<Option<reload::Handle<LevelFilter, Registry>>> = OnceLock::new();

/// Sets the log level, installing the subscriber on first call.
pub fn set_level(level: LogLevel) {
    let handle = HANDLE.get_or_init(|| {
        let (filter, handle) = reload::Layer::new(level.filter());
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .ok()
            .map(|()| handle)
    });
    if let Some(handle) = handle {
        // Fails only once the subscriber is gone.
        let _ = handle.reload(level.filter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filters() {
        assert_eq!(LogLevel::Info.filter(), LevelFilter::INFO);
        assert_eq!(LogLevel::Error.filter(), LevelFilter::ERROR);
        assert_eq!(LogLevel::Disabled.filter(), LevelFilter::OFF);
    }

    #[test]
    fn test_set_level_is_repeatable() {
        set_level(LogLevel::Error);
        set_level(LogLevel::Disabled);
        set_level(LogLevel::Info);
    }

    #[test]
    fn test_level_deserializes_lowercase() {
        let level: LogLevel = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(level, LogLevel::Disabled);
    }
}
