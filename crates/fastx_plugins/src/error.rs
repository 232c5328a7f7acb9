//! Error type for plugin discovery, loading, and registration.

use fastx_core::Id;
use fastx_env::EnvError;
use fastx_menu::MenuError;

/// Errors raised while discovering, loading, registering, or tearing down a
/// plugin.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// The plugin's environment could not be created or synced.
    #[error("environment error for {plugin}: {source}")]
    Env {
        /// The plugin the environment belongs to.
        plugin: Id,
        /// Underlying environment error.
        #[source]
        source: EnvError,
    },
    /// The entry module does not expose exactly one conforming plugin
    /// class.
    #[error("plugin {0} entry module exposes {1} candidate classes, expected exactly 1")]
    AmbiguousEntryClass(Id, usize),
    /// The subprocess driver script could not be invoked or its stdout
    /// could not be parsed as the expected JSON envelope.
    #[error("failed to invoke {plugin}.{method}: {detail}")]
    InvocationFailed {
        /// The plugin being invoked.
        plugin: Id,
        /// The lifecycle method that was called (`get_info`, `initialize`, ...).
        method: &'static str,
        /// Human-readable detail: parse error, non-zero exit, or plugin-reported error.
        detail: String,
    },
    /// `get_info` succeeded but the returned metadata failed schema
    /// validation.
    #[error("plugin {0} metadata failed validation: {1}")]
    InvalidMetadata(Id, String),
    /// An operation referenced a plugin ID unknown to the registry.
    #[error("plugin {0} is not known to the registry")]
    NotFound(Id),
    /// A registration request referenced a menu/action ID it does not own
    /// during cleanup.
    #[error("menu graph error while registering {plugin}: {source}")]
    Graph {
        /// The plugin being registered.
        plugin: Id,
        /// Underlying menu graph error.
        #[source]
        source: MenuError,
    },
}
