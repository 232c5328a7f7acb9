//! The Update Manager: release polling, asset selection, and self-update.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::client::ReleaseIndexClient;
use crate::error::UpdateError;
use crate::platform::{fallback_download_url, select_asset, Platform};
use crate::swap::{download_to_sibling, stage_and_launch_helper};
use crate::types::{CheckResult, Release, ReleaseAsset, VersionSummary};
use crate::version::ReleaseVersion;

const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(86_400);

/// How the running application was launched, which determines how
/// `update()` applies a new version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchKind {
    /// Running as a compiled, standalone binary: eligible for the staged
    /// binary swap.
    Native,
    /// Running under a package manager (e.g. installed via `pip`/`cargo
    /// install`): updates are delegated to that package manager.
    Managed {
        /// The command used to upgrade the package, e.g.
        /// `["pip", "install", "--upgrade", "fastx_tui"]`.
        upgrade_argv: &'static [&'static str],
    },
}

struct ManagerState {
    last_check: Option<Instant>,
    latest_version: Option<String>,
    update_available: bool,
    version_check_failed: bool,
    assets: Vec<ReleaseAsset>,
}

/// Decides whether a newer release exists and, on demand, applies it.
/// Mirrors `original_source/core/update_manager.py::UpdateManager`.
pub struct UpdateManager {
    client: ReleaseIndexClient,
    current_version: String,
    check_interval: Duration,
    launch_kind: LaunchKind,
    current_exe: PathBuf,
    state: Mutex<ManagerState>,
}

impl UpdateManager {
    /// Creates a manager polling `repo` (`owner/name`) for releases newer
    /// than `current_version`.
    #[must_use]
    pub fn new(
        repo: impl Into<String>,
        current_version: impl Into<String>,
        current_exe: PathBuf,
        launch_kind: LaunchKind,
    ) -> Self {
        Self {
            client: ReleaseIndexClient::new(repo),
            current_version: current_version.into(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            launch_kind,
            current_exe,
            state: Mutex::new(ManagerState {
                last_check: None,
                latest_version: None,
                update_available: false,
                version_check_failed: false,
                assets: Vec::new(),
            }),
        }
    }

    /// Like [`Self::new`], but polls `base_url` instead of the default
    /// GitHub API host. Used to aim the release index at a local responder
    /// in tests.
    #[must_use]
    pub fn new_with_base_url(
        repo: impl Into<String>,
        base_url: impl Into<String>,
        current_version: impl Into<String>,
        current_exe: PathBuf,
        launch_kind: LaunchKind,
    ) -> Self {
        let repo = repo.into();
        Self {
            client: ReleaseIndexClient::with_base_url(repo, base_url),
            current_version: current_version.into(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            launch_kind,
            current_exe,
            state: Mutex::new(ManagerState {
                last_check: None,
                latest_version: None,
                update_available: false,
                version_check_failed: false,
                assets: Vec::new(),
            }),
        }
    }

    /// Checks the release index for a newer version, throttled to once per
    /// `check_interval` unless `force` is set. A network or parse failure
    /// marks `version_check_failed` but never mutates `latest_version`.
    pub async fn check(&self, force: bool) -> Result<CheckResult, UpdateError> {
        {
            let mut state = self.state.lock();
            if !force {
                if let Some(last) = state.last_check {
                    if last.elapsed() < self.check_interval {
                        return Ok(CheckResult {
                            update_available: state.update_available,
                            latest_version: state.latest_version.clone(),
                            assets: state.assets.clone(),
                        });
                    }
                }
            }
            state.last_check = Some(Instant::now());
            state.version_check_failed = false;
        }

        match self.client.latest_release().await {
            Ok(release) => {
                let current = ReleaseVersion::parse(&self.current_version);
                let latest = ReleaseVersion::parse(&release.version);
                let update_available = match (&current, &latest) {
                    (Some(current), Some(latest)) => current.is_older_than(latest),
                    _ => false,
                };

                let mut state = self.state.lock();
                state.latest_version = Some(release.version.clone());
                state.update_available = update_available;
                state.assets = release.assets.clone();
                info!(
                    current = %self.current_version,
                    latest = %release.version,
                    update_available,
                    "version check complete"
                );

                Ok(CheckResult {
                    update_available,
                    latest_version: Some(release.version),
                    assets: release.assets,
                })
            }
            Err(err) => {
                warn!(%err, "version check failed");
                self.state.lock().version_check_failed = true;
                Err(err)
            }
        }
    }

    /// Lists up to `limit` releases, newest first.
    pub async fn list_versions(&self, limit: u32) -> Result<Vec<VersionSummary>, UpdateError> {
        let releases: Vec<Release> = self.client.list_releases(limit).await?;
        Ok(releases.into_iter().map(VersionSummary::from).collect())
    }

    /// Whether the most recent check found a newer version.
    pub fn update_available(&self) -> bool {
        self.state.lock().update_available
    }

    /// Whether the most recent check failed outright.
    pub fn version_check_failed(&self) -> bool {
        self.state.lock().version_check_failed
    }

    /// Applies the previously detected update. On a `Native` launch, stages
    /// a binary swap and spawns the helper script; the caller must exit the
    /// process immediately after a successful return so the helper can
    /// finish. On a `Managed` launch, runs the configured upgrade command
    /// and waits for it to complete.
    pub async fn update(&self) -> Result<(), UpdateError> {
        let (latest_version, assets) = {
            let state = self.state.lock();
            if !state.update_available {
                return Err(UpdateError::NoUpdateAvailable);
            }
            let Some(latest) = state.latest_version.clone() else {
                return Err(UpdateError::NoUpdateAvailable);
            };
            (latest, state.assets.clone())
        };

        match self.launch_kind {
            LaunchKind::Managed { upgrade_argv } => {
                let [program, args @ ..] = upgrade_argv else {
                    return Err(UpdateError::SwapFailed(
                        "upgrade_argv must name a program".to_string(),
                    ));
                };
                let output = tokio::process::Command::new(program)
                    .args(args)
                    .output()
                    .await
                    .map_err(|err| UpdateError::SwapFailed(err.to_string()))?;
                if !output.status.success() {
                    return Err(UpdateError::SwapFailed(format!(
                        "upgrade command exited with {}: {}",
                        output.status,
                        String::from_utf8_lossy(&output.stderr)
                    )));
                }
                info!("application updated via managed package upgrade");
                Ok(())
            }
            LaunchKind::Native => {
                let platform = Platform::current().ok_or(UpdateError::NoMatchingAsset)?;
                let url = match select_asset(platform, &assets) {
                    Some(asset) => asset.browser_download_url,
                    None if assets.is_empty() => fallback_download_url(platform, &latest_version),
                    None => return Err(UpdateError::NoMatchingAsset),
                };

                let http = reqwest::Client::new();
                let new_exe = download_to_sibling(&http, &url, &self.current_exe).await?;
                stage_and_launch_helper(&self.current_exe, &new_exe).await?;
                info!("staged binary swap; exit the process to complete the update");
                Ok(())
            }
        }
    }
}

/// The repository polled by the default deployment of this application.
pub const DEFAULT_REPO: &str = "fastxteam/FastX-Tui";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_manager_has_no_update_until_checked() {
        let manager = UpdateManager::new(
            DEFAULT_REPO,
            "v0.1.0",
            PathBuf::from("/opt/fastx-tui"),
            LaunchKind::Native,
        );
        assert!(!manager.update_available());
        assert!(!manager.version_check_failed());
    }
}
