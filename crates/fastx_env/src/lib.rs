//! Per-plugin dependency environment management.
//!
//! Each plugin gets its own environment rooted under a shared base
//! directory, created with `uv` (falling back to `python3 -m venv`) and
//! kept in sync with the plugin's manifest. Plugin code is always run in a
//! subprocess using that environment's interpreter; nothing here embeds a
//! Python runtime.

pub mod environment;
pub mod error;

pub use environment::{EnvironmentManager, ExecOutcome, PluginEnvStamp};
pub use error::EnvError;

/// Commonly used types, for glob import by dependent crates.
pub mod prelude {
    pub use crate::environment::{EnvironmentManager, ExecOutcome, PluginEnvStamp};
    pub use crate::error::EnvError;
}
