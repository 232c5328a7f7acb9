//! Release polling, platform-aware asset selection, and staged self-update.

mod client;
mod error;
mod manager;
mod platform;
mod swap;
mod types;
mod version;

pub use client::ReleaseIndexClient;
pub use error::UpdateError;
pub use manager::{LaunchKind, UpdateManager, DEFAULT_REPO};
pub use platform::{fallback_download_url, select_asset, Platform};
pub use types::{CheckResult, Release, ReleaseAsset, VersionSummary};
pub use version::ReleaseVersion;

/// Commonly used types, re-exported for convenient `use fastx_update::prelude::*;`.
pub mod prelude {
    pub use crate::{CheckResult, LaunchKind, Platform, UpdateError, UpdateManager};
}
