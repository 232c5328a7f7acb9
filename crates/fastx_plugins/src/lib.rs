//! Plugin discovery, per-plugin environments, subprocess invocation,
//! declarative registration, and lifecycle state tracking.

mod candidate;
mod driver;
mod error;
mod info;
mod registration;
mod registry;
mod state;

pub use candidate::{discover, CandidateKind, PluginCandidate};
pub use driver::{PluginDriver, DEFAULT_CALL_TIMEOUT};
pub use error::PluginError;
pub use info::PluginInfo;
pub use registration::{apply_registration_requests, ActionPayloadRequest, RegistrationRequest};
pub use registry::{PluginRegistry, PluginSummary};
pub use state::{LoadedPlugin, PluginState};

/// Commonly used types, re-exported for convenient `use fastx_plugins::prelude::*;`.
pub mod prelude {
    pub use crate::{
        CandidateKind, LoadedPlugin, PluginCandidate, PluginDriver, PluginError, PluginInfo,
        PluginRegistry, PluginState, PluginSummary, RegistrationRequest,
    };
}
