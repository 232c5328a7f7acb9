//! Error type for the config store.

use std::sync::Arc;

/// Errors raised while reading or writing configuration.
#[derive(Debug, thiserror::Error, Clone)]
pub enum ConfigError {
    /// A proposed value failed schema validation; the store was left
    /// unchanged.
    #[error("invalid config value for {key}: {}", reasons.join("; "))]
    ConfigInvalid {
        /// The key that was rejected.
        key: String,
        /// Every validation failure found.
        reasons: Vec<String>,
    },
    /// An I/O or SQLite error occurred while reading or writing the store.
    #[error("config store I/O error: {0}")]
    ConfigIOError(#[from] Arc<rusqlite::Error>),
    /// The requested key does not exist on the target schema.
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::ConfigIOError(Arc::new(err))
    }
}
