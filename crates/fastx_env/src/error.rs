//! Error type for environment creation, sync, and removal.

use std::io;
use std::sync::Arc;

use fastx_core::Id;

/// Errors raised while creating, syncing, or removing a plugin's dependency
/// environment.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnvError {
    /// Neither `uv venv` nor `python3 -m venv` produced a usable environment.
    #[error("failed to create environment for {plugin}: {detail}")]
    CreateFailed {
        /// The plugin the environment belongs to.
        plugin: Id,
        /// Combined stderr from whichever creator tool was tried last.
        detail: String,
    },
    /// Dependency synchronization (`uv sync`/`pip install`) failed.
    #[error("failed to sync dependencies for {plugin}: {detail}")]
    SyncFailed {
        /// The plugin the environment belongs to.
        plugin: Id,
        /// Combined stderr from whichever sync tool was tried last.
        detail: String,
    },
    /// The environment directory could not be removed.
    #[error("failed to remove environment for {plugin}: {source}")]
    RemoveFailed {
        /// The plugin the environment belongs to.
        plugin: Id,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// `exec_in` could not spawn the subprocess at all (the interpreter
    /// binary is missing, permissions, etc.). A non-zero exit from a
    /// spawned subprocess is not an error — see [`crate::environment::ExecOutcome`].
    #[error("failed to launch {plugin}'s interpreter: {source}")]
    SpawnFailed {
        /// The plugin the environment belongs to.
        plugin: Id,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },
    /// The subprocess did not exit within the requested timeout and was
    /// killed.
    #[error("{plugin}'s subprocess exceeded its timeout and was killed")]
    Timeout {
        /// The plugin the environment belongs to.
        plugin: Id,
    },
}
