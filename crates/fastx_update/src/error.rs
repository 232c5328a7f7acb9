//! Error type for release checking, download, and self-update.

use std::sync::Arc;

/// Errors raised while checking for, downloading, or applying an update.
#[derive(Debug, thiserror::Error, Clone)]
pub enum UpdateError {
    /// The release index could not be reached or returned a non-success
    /// status.
    #[error("release index request failed: {0}")]
    Network(Arc<reqwest::Error>),
    /// The release index response could not be parsed.
    #[error("release index response was malformed: {0}")]
    MalformedResponse(String),
    /// No release asset matched the running platform.
    #[error("no release asset matches this platform")]
    NoMatchingAsset,
    /// Downloaded content failed a sanity check (empty, truncated).
    #[error("downloaded asset failed validation: {0}")]
    InvalidAsset(String),
    /// A filesystem step of the staged swap failed.
    #[error("update swap failed: {0}")]
    SwapFailed(String),
    /// No update is currently available to apply.
    #[error("no update is available to apply")]
    NoUpdateAvailable,
}

impl From<reqwest::Error> for UpdateError {
    fn from(err: reqwest::Error) -> Self {
        UpdateError::Network(Arc::new(err))
    }
}
