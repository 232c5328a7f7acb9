//! Composed error type for the Lifecycle Controller.

use fastx_config::ConfigError;
use fastx_core::Id;
use fastx_menu::MenuError;
use fastx_plugins::PluginError;
use fastx_update::UpdateError;

/// Errors raised by [`crate::runtime::Runtime`] operations. Wraps the
/// per-component error types via `#[from]` only where the controller itself
/// produces a genuinely composed failure; a plugin-scoped failure from
/// [`PluginError`] is never flattened into a different variant.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The config store rejected a read or write.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Plugin discovery, loading, or registration failed.
    #[error(transparent)]
    Plugin(#[from] PluginError),
    /// A menu graph mutation failed outside the plugin registry's own error
    /// path (e.g. while the controller rebuilds the system menu subtree).
    #[error(transparent)]
    Menu(#[from] MenuError),
    /// A release check or self-update failed.
    #[error(transparent)]
    Update(#[from] UpdateError),
    /// `uninstall` could not remove the plugin's source directory.
    #[error("failed to remove plugin directory for {plugin}: {detail}")]
    DirectoryRemoval {
        /// The plugin whose directory removal failed.
        plugin: Id,
        /// Underlying I/O detail.
        detail: String,
    },
    /// Scanning the plugin directory failed outright (not a per-plugin
    /// failure, so there is no offending [`Id`] to attach).
    #[error("plugin discovery failed: {0}")]
    Discovery(String),
}
