//! Per-plugin lifecycle state.

use std::path::PathBuf;

use fastx_core::Id;
use hashbrown::HashSet;

use crate::candidate::CandidateKind;
use crate::info::PluginInfo;

/// A plugin's position in its lifecycle state machine.
///
/// ```text
///  discovered --ensure_env--> env-ready --load_entry--> loaded --register--> registered
///       \                                        \
///        `----------(any step fails)-------------`-> failed
/// ```
/// `removed` and `failed` are terminal (`failed` until a reload attempt);
/// `disabled` is reachable from `registered` and is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Found by discovery, nothing else done yet.
    Discovered,
    /// Dependency environment created and synced.
    EnvReady,
    /// Entry module imported, metadata validated, `initialize` returned.
    Loaded,
    /// `register` ran; `registered_ids` reflects what it contributed.
    Registered,
    /// Config says disabled; no registration exists.
    Disabled,
    /// Some step in the pipeline failed; see `last_error`.
    Failed,
    /// Uninstalled; no longer tracked for loading.
    Removed,
}

/// A plugin the registry knows about, with its current lifecycle state.
#[derive(Debug, Clone)]
pub struct LoadedPlugin {
    /// The plugin's identifier (derived from its directory/file name).
    pub id: Id,
    /// Absolute path to the plugin's directory or legacy file.
    pub path: PathBuf,
    /// Directory vs. legacy-file, carried from discovery.
    pub kind: CandidateKind,
    /// Validated metadata, once available.
    pub info: Option<PluginInfo>,
    /// Current lifecycle state.
    pub state: PluginState,
    /// The most recent failure, if `state == Failed`.
    pub last_error: Option<String>,
    /// IDs this plugin has contributed to the Menu Graph; exactly what must
    /// be removed on disable/uninstall/reload.
    pub registered_ids: HashSet<Id>,
}

impl LoadedPlugin {
    /// Creates a freshly discovered plugin record.
    #[must_use]
    pub fn discovered(id: Id, path: PathBuf, kind: CandidateKind) -> Self {
        Self {
            id,
            path,
            kind,
            info: None,
            state: PluginState::Discovered,
            last_error: None,
            registered_ids: HashSet::new(),
        }
    }

    /// Marks this plugin failed, recording `error`.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = PluginState::Failed;
        self.last_error = Some(error.into());
    }
}
