//! Per-plugin dependency environment lifecycle.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use fastx_core::Id;
use parking_lot::Mutex;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::EnvError;

const MANIFEST_FILES: &[&str] = ["pyproject.toml", "uv.lock", "requirements.txt"].as_slice();

/// The exit code, stdout, and stderr of a subprocess run via
/// [`EnvironmentManager::exec_in`]. A non-zero `exit_code` is not an error;
/// callers inspect it themselves.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    /// Process exit code, or `-1` if the process was terminated by a signal.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: Vec<u8>,
    /// Captured standard error.
    pub stderr: Vec<u8>,
}

/// Creates, refreshes, and removes per-plugin virtual environments rooted
/// under a single base directory, and runs subprocesses inside them.
///
/// Prefers `uv` for environment creation and dependency sync, falling back
/// to `python3 -m venv` and `pip` when `uv` is unavailable or fails.
pub struct EnvironmentManager {
    base_dir: PathBuf,
    uv_available: Mutex<Option<bool>>,
}

impl EnvironmentManager {
    /// Creates a manager rooted at `base_dir`. Does not touch the
    /// filesystem until an operation is performed.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            uv_available: Mutex::new(None),
        }
    }

    /// The directory a given plugin's environment lives in.
    #[must_use]
    pub fn env_path(&self, plugin_id: &Id) -> PathBuf {
        self.base_dir.join(plugin_id.as_str())
    }

    /// The interpreter binary inside a plugin's environment.
    #[must_use]
    pub fn python_path(&self, plugin_id: &Id) -> PathBuf {
        let env = self.env_path(plugin_id);
        if cfg!(windows) {
            env.join("Scripts").join("python.exe")
        } else {
            env.join("bin").join("python")
        }
    }

    fn uv_path(&self, plugin_id: &Id) -> PathBuf {
        let env = self.env_path(plugin_id);
        if cfg!(windows) {
            env.join("Scripts").join("uv.exe")
        } else {
            env.join("bin").join("uv")
        }
    }

    /// Structural check: environment directory and interpreter both present.
    #[must_use]
    pub fn exists(&self, plugin_id: &Id) -> bool {
        self.env_path(plugin_id).is_dir() && self.python_path(plugin_id).is_file()
    }

    /// `true` iff the environment's modification time is newer than every
    /// manifest file present in `plugin_dir`.
    #[must_use]
    pub fn is_fresh(&self, plugin_id: &Id, plugin_dir: &Path) -> bool {
        if !self.exists(plugin_id) {
            return false;
        }
        let Ok(env_mtime) = self.env_path(plugin_id).metadata().and_then(|m| m.modified()) else {
            return false;
        };
        for manifest in MANIFEST_FILES {
            let path = plugin_dir.join(manifest);
            if let Ok(meta) = path.metadata() {
                if let Ok(manifest_mtime) = meta.modified() {
                    if manifest_mtime > env_mtime {
                        debug!(plugin = %plugin_id, manifest, "manifest newer than environment");
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Idempotent: if `is_fresh`, does nothing; otherwise (re)creates the
    /// environment and synchronizes dependencies.
    pub async fn ensure(&self, plugin_id: &Id, plugin_dir: &Path) -> Result<(), EnvError> {
        if self.is_fresh(plugin_id, plugin_dir) {
            debug!(plugin = %plugin_id, "environment already fresh");
            return Ok(());
        }
        self.create(plugin_id, plugin_dir).await?;
        self.sync(plugin_id, plugin_dir).await
    }

    async fn create(&self, plugin_id: &Id, plugin_dir: &Path) -> Result<(), EnvError> {
        let env_path = self.env_path(plugin_id);
        if env_path.exists() {
            self.remove(plugin_id).await?;
        }
        if self.uv_available().await {
            let output = Command::new("uv")
                .args(["venv"])
                .arg(&env_path)
                .output()
                .await;
            match output {
                Ok(out) if out.status.success() => {
                    info!(plugin = %plugin_id, "created environment with uv");
                    return Ok(());
                }
                Ok(out) => warn!(
                    plugin = %plugin_id,
                    stderr = %String::from_utf8_lossy(&out.stderr),
                    "uv venv failed, falling back to python3 -m venv"
                ),
                Err(err) => warn!(plugin = %plugin_id, %err, "uv venv failed to spawn, falling back"),
            }
        }

        let output = Command::new("python3")
            .args(["-m", "venv"])
            .arg(&env_path)
            .output()
            .await
            .map_err(|source| EnvError::CreateFailed {
                plugin: plugin_id.clone(),
                detail: source.to_string(),
            })?;
        if !output.status.success() {
            return Err(EnvError::CreateFailed {
                plugin: plugin_id.clone(),
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        info!(plugin = %plugin_id, "created environment with python3 -m venv");
        Ok(())
    }

    async fn sync(&self, plugin_id: &Id, plugin_dir: &Path) -> Result<(), EnvError> {
        let lock_present = plugin_dir.join("uv.lock").is_file();
        let uv_path = self.uv_path(plugin_id);
        let uv_in_env = uv_path.is_file();

        if lock_present || uv_in_env || self.uv_available().await {
            let uv_bin: &Path = if uv_in_env { &uv_path } else { Path::new("uv") };
            let output = Command::new(uv_bin)
                .arg("sync")
                .current_dir(plugin_dir)
                .output()
                .await
                .map_err(|source| EnvError::SyncFailed {
                    plugin: plugin_id.clone(),
                    detail: source.to_string(),
                })?;
            if output.status.success() {
                info!(plugin = %plugin_id, "synced dependencies with uv");
                return Ok(());
            }
            warn!(
                plugin = %plugin_id,
                stderr = %String::from_utf8_lossy(&output.stderr),
                "uv sync failed, falling back to pip"
            );
        }

        let python = self.python_path(plugin_id);
        let requirements = plugin_dir.join("requirements.txt");
        let args: Vec<&std::ffi::OsStr> = if requirements.is_file() {
            vec![
                "-m".as_ref(),
                "pip".as_ref(),
                "install".as_ref(),
                "-r".as_ref(),
                requirements.as_os_str(),
            ]
        } else {
            vec!["-m".as_ref(), "pip".as_ref(), "install".as_ref(), ".".as_ref()]
        };
        let output = Command::new(&python)
            .args(&args)
            .current_dir(plugin_dir)
            .output()
            .await
            .map_err(|source| EnvError::SyncFailed {
                plugin: plugin_id.clone(),
                detail: source.to_string(),
            })?;
        if !output.status.success() {
            return Err(EnvError::SyncFailed {
                plugin: plugin_id.clone(),
                detail: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        info!(plugin = %plugin_id, "synced dependencies with pip");
        Ok(())
    }

    /// Deletes the environment directory, clearing read-only attributes on
    /// descendants first (some venv creators mark interpreter files
    /// read-only on Windows).
    pub async fn remove(&self, plugin_id: &Id) -> Result<(), EnvError> {
        let env_path = self.env_path(plugin_id);
        if !env_path.exists() {
            return Ok(());
        }
        let path = env_path.clone();
        tokio::task::spawn_blocking(move || clear_readonly_recursive(&path))
            .await
            .expect("blocking task panicked")
            .map_err(|source| EnvError::RemoveFailed {
                plugin: plugin_id.clone(),
                source: Arc::new(source),
            })?;
        tokio::fs::remove_dir_all(&env_path)
            .await
            .map_err(|source| EnvError::RemoveFailed {
                plugin: plugin_id.clone(),
                source: Arc::new(source),
            })?;
        info!(plugin = %plugin_id, "removed environment");
        Ok(())
    }

    /// Runs `argv` using the plugin's interpreter, optionally in `cwd`,
    /// killing it if it exceeds `timeout_duration`. Never errors on a
    /// non-zero exit; surfaces it through [`ExecOutcome::exit_code`].
    pub async fn exec_in(
        &self,
        plugin_id: &Id,
        argv: &[String],
        cwd: Option<&Path>,
        timeout_duration: Duration,
    ) -> Result<ExecOutcome, EnvError> {
        let python = self.python_path(plugin_id);
        let mut command = Command::new(&python);
        command.args(argv).stdin(Stdio::null());
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }
        let child = command
            .spawn()
            .map_err(|source| EnvError::SpawnFailed {
                plugin: plugin_id.clone(),
                source: Arc::new(source),
            })?;

        match timeout(timeout_duration, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ExecOutcome {
                exit_code: output.status.code().unwrap_or(-1),
                stdout: output.stdout,
                stderr: output.stderr,
            }),
            Ok(Err(source)) => Err(EnvError::SpawnFailed {
                plugin: plugin_id.clone(),
                source: Arc::new(source),
            }),
            Err(_elapsed) => Err(EnvError::Timeout {
                plugin: plugin_id.clone(),
            }),
        }
    }

    async fn uv_available(&self) -> bool {
        if let Some(cached) = *self.uv_available.lock() {
            return cached;
        }
        let available = Command::new("uv")
            .arg("--version")
            .output()
            .await
            .map(|out| out.status.success())
            .unwrap_or(false);
        *self.uv_available.lock() = Some(available);
        available
    }
}

/// The last time a plugin's environment was touched, for display/diagnostic
/// purposes (creation, last sync, last removal attempt, last freshness
/// check), plus whether it is currently usable.
#[derive(Debug, Clone, Default)]
pub struct PluginEnvStamp {
    /// When the environment was created.
    pub created_at: Option<SystemTime>,
    /// When dependencies were last synchronized successfully.
    pub synced_at: Option<SystemTime>,
    /// When a freshness check last ran.
    pub checked_at: Option<SystemTime>,
    /// When the environment was last removed, if ever.
    pub removed_at: Option<SystemTime>,
    /// Whether the environment currently exists and is synced.
    pub ready: bool,
}

fn clear_readonly_recursive(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        for entry in std::fs::read_dir(path)? {
            let entry = entry?;
            clear_readonly_recursive(&entry.path())?;
        }
    }
    let metadata = std::fs::metadata(path)?;
    let mut perms = metadata.permissions();
    if perms.readonly() {
        perms.set_readonly(false);
        std::fs::set_permissions(path, perms)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn env_path_is_base_joined_with_plugin_id() {
        let manager = EnvironmentManager::new("/tmp/fastx_envs");
        assert_eq!(manager.env_path(&id("demo")), PathBuf::from("/tmp/fastx_envs/demo"));
    }

    #[test]
    fn exists_is_false_for_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let manager = EnvironmentManager::new(dir.path());
        assert!(!manager.exists(&id("demo")));
    }

    #[test]
    fn is_fresh_is_false_when_environment_missing() {
        let dir = tempfile::tempdir().unwrap();
        let manager = EnvironmentManager::new(dir.path().join("envs"));
        assert!(!manager.is_fresh(&id("demo"), dir.path()));
    }

    #[tokio::test]
    async fn remove_on_missing_environment_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let manager = EnvironmentManager::new(dir.path());
        manager.remove(&id("ghost")).await.unwrap();
    }

    #[test]
    fn is_fresh_detects_stale_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("envs");
        let manager = EnvironmentManager::new(&base);
        let env_dir = manager.env_path(&id("demo"));
        fs::create_dir_all(env_dir.join(if cfg!(windows) { "Scripts" } else { "bin" })).unwrap();
        let interp = manager.python_path(&id("demo"));
        fs::write(&interp, b"").unwrap();

        fs::write(dir.path().join("pyproject.toml"), b"[project]").unwrap();
        // freshly created interpreter should be newer than the manifest we
        // just wrote in the same instant on most filesystems; to exercise
        // the stale branch deterministically we touch the manifest after.
        std::thread::sleep(std::time::Duration::from_millis(20));
        fs::write(dir.path().join("pyproject.toml"), b"[project]\nname=\"x\"").unwrap();

        assert!(!manager.is_fresh(&id("demo"), dir.path()));
    }
}
