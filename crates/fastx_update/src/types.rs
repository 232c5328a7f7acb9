//! Wire types for the release index and outward-facing query results.

use serde::{Deserialize, Serialize};

/// One downloadable artifact attached to a release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseAsset {
    /// File name as published.
    pub name: String,
    /// Direct download URL.
    pub browser_download_url: String,
}

/// One entry of the release index, as returned by the upstream host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Tag name, e.g. `v1.4.0`.
    #[serde(rename = "tag_name")]
    pub version: String,
    /// Display name of the release.
    #[serde(default)]
    pub name: String,
    /// Publication timestamp, as published by the index (ISO 8601).
    #[serde(default, rename = "published_at")]
    pub published_at: String,
    /// Web page for the release.
    #[serde(default, rename = "html_url")]
    pub html_url: String,
    /// Release notes body.
    #[serde(default)]
    pub body: String,
    /// Attached downloadable artifacts.
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

/// Result of [`crate::UpdateManager::check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    /// Whether a strictly newer release was found.
    pub update_available: bool,
    /// The newest release's version tag, if the check succeeded.
    pub latest_version: Option<String>,
    /// Assets attached to the newest release.
    pub assets: Vec<ReleaseAsset>,
}

/// One row of [`crate::UpdateManager::list_versions`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSummary {
    /// Release tag.
    pub version: String,
    /// Publication timestamp.
    pub published_at: String,
    /// Display name.
    pub name: String,
    /// Web page for the release.
    pub html_url: String,
    /// Release notes body.
    pub body: String,
}

impl From<Release> for VersionSummary {
    fn from(release: Release) -> Self {
        Self {
            version: release.version,
            published_at: release.published_at,
            name: release.name,
            html_url: release.html_url,
            body: release.body,
        }
    }
}
