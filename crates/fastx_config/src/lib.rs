//! Durable, typed configuration: app settings, user preferences, and
//! per-plugin config, backed by a single SQLite file.

mod error;
mod schema;
mod store;

pub use error::ConfigError;
pub use schema::{AppConfig, BannerStyle, ColorScheme, DefaultView, LogLevel, UserPreferences};
pub use store::ConfigStore;

/// Commonly used types, re-exported for convenient `use fastx_config::prelude::*;`.
pub mod prelude {
    pub use crate::{AppConfig, ConfigError, ConfigStore, UserPreferences};
}
