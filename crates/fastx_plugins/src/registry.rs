//! The Plugin Registry: discovery, loading, and lifecycle state for every
//! known plugin.
//!
//! Each plugin gets its own `tokio::sync::Mutex` "operation lock", held for
//! the duration of whichever lifecycle call is in flight for that plugin.
//! Two different plugins' operations never wait on each other; only two
//! concurrent operations on the *same* plugin do. The plugin's own data
//! (`LoadedPlugin`) sits behind a separate, short-held `parking_lot::Mutex`
//! that is never held across an `await`.

use std::path::PathBuf;
use std::sync::Arc;

use fastx_core::Id;
use fastx_env::EnvironmentManager;
use fastx_menu::MenuGraph;
use hashbrown::HashMap;
use parking_lot::Mutex as SyncMutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use crate::candidate::discover as discover_candidates;
use crate::driver::PluginDriver;
use crate::error::PluginError;
use crate::info::PluginInfo;
use crate::registration::{apply_registration_requests, RegistrationRequest};
use crate::state::{LoadedPlugin, PluginState};

/// Summary row returned by [`PluginRegistry::list`].
#[derive(Debug, Clone)]
pub struct PluginSummary {
    /// The plugin's identifier.
    pub id: Id,
    /// Whether `load` has completed successfully for this plugin.
    pub loaded: bool,
    /// Whether the plugin is currently enabled.
    pub enabled: bool,
    /// Validated metadata, if loaded.
    pub info: Option<PluginInfo>,
    /// The most recent failure, if any step of the pipeline has failed.
    pub last_error: Option<String>,
}

/// One tracked plugin: its data plus the operation lock serializing
/// lifecycle calls against it.
struct PluginEntry {
    data: Arc<SyncMutex<LoadedPlugin>>,
    op_lock: Arc<AsyncMutex<()>>,
}

impl PluginEntry {
    fn new(plugin: LoadedPlugin) -> Self {
        Self {
            data: Arc::new(SyncMutex::new(plugin)),
            op_lock: Arc::new(AsyncMutex::new(())),
        }
    }
}

impl Clone for PluginEntry {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            op_lock: Arc::clone(&self.op_lock),
        }
    }
}

/// Discovers, loads, registers, and tears down plugins found under a single
/// directory, each isolated in its own dependency environment. Every method
/// takes `&self`: concurrency between unrelated plugins is the point, so
/// interior mutability lives in per-plugin locks rather than one exclusive
/// borrow of the whole registry.
pub struct PluginRegistry {
    plugin_dir: PathBuf,
    env: EnvironmentManager,
    plugins: SyncMutex<HashMap<Id, PluginEntry>>,
    order: SyncMutex<Vec<Id>>,
}

impl PluginRegistry {
    /// Creates a registry rooted at `plugin_dir`, with per-plugin
    /// environments under `env_base_dir`.
    #[must_use]
    pub fn new(plugin_dir: impl Into<PathBuf>, env_base_dir: impl Into<PathBuf>) -> Self {
        Self {
            plugin_dir: plugin_dir.into(),
            env: EnvironmentManager::new(env_base_dir),
            plugins: SyncMutex::new(HashMap::new()),
            order: SyncMutex::new(Vec::new()),
        }
    }

    fn entry(&self, id: &Id) -> Option<PluginEntry> {
        self.plugins.lock().get(id).cloned()
    }

    /// One filesystem scan. Adds newly seen candidates as `Discovered`;
    /// leaves already-known plugins untouched. Returns IDs in discovery
    /// (name-sorted) order.
    pub fn discover(&self) -> std::io::Result<Vec<Id>> {
        let candidates = discover_candidates(&self.plugin_dir)?;
        let mut order = self.order.lock();
        let mut plugins = self.plugins.lock();
        order.clear();
        for candidate in candidates {
            order.push(candidate.id.clone());
            plugins.entry(candidate.id.clone()).or_insert_with(|| {
                PluginEntry::new(LoadedPlugin::discovered(
                    candidate.id,
                    candidate.path,
                    candidate.kind,
                ))
            });
        }
        Ok(order.clone())
    }

    /// Runs the full load pipeline for `id`: ensure its environment, import
    /// its entry module, validate its metadata, and call `initialize`.
    ///
    /// If the plugin's declared metadata has `enabled: false`, the plugin
    /// is left in the `Disabled` state without being initialized.
    pub async fn load(&self, id: &Id) -> Result<(), PluginError> {
        let entry = self.entry(id).ok_or_else(|| PluginError::NotFound(id.clone()))?;
        let _op = entry.op_lock.lock().await;
        self.load_locked(id, &entry).await
    }

    /// The body of [`Self::load`], assuming `entry`'s operation lock is
    /// already held by the caller. Lets [`Self::reload`] run disable, the
    /// environment reset, and load as one atomic operation against this
    /// plugin.
    async fn load_locked(&self, id: &Id, entry: &PluginEntry) -> Result<(), PluginError> {
        let snapshot = entry.data.lock().clone();

        if let Err(err) = self.env.ensure(id, &snapshot.path).await {
            entry.data.lock().fail(err.to_string());
            return Err(PluginError::Env {
                plugin: id.clone(),
                source: err,
            });
        }
        entry.data.lock().state = PluginState::EnvReady;

        let driver = PluginDriver::new(&self.env);
        let entry_file = snapshot.path_entry_file();

        let info_value = driver
            .call(id, &entry_file, &snapshot.path, "get_info")
            .await
            .map_err(|err| {
                entry.data.lock().fail(err.to_string());
                err
            })?;
        let info: PluginInfo = serde_json::from_value(info_value).map_err(|err| {
            let detail = format!("get_info did not return a valid PluginInfo object: {err}");
            entry.data.lock().fail(detail.clone());
            PluginError::InvalidMetadata(id.clone(), detail)
        })?;
        if let Err(errors) = info.validate() {
            let detail = errors.join("; ");
            entry.data.lock().fail(detail.clone());
            return Err(PluginError::InvalidMetadata(id.clone(), detail));
        }

        entry.data.lock().info = Some(info.clone());

        if !info.enabled {
            entry.data.lock().state = PluginState::Disabled;
            info!(plugin = %id, "plugin declared itself disabled");
            return Ok(());
        }

        driver
            .call(id, &entry_file, &snapshot.path, "initialize")
            .await
            .map_err(|err| {
                entry.data.lock().fail(err.to_string());
                err
            })?;

        entry.data.lock().state = PluginState::Loaded;
        info!(plugin = %id, version = %info.version, "plugin loaded");
        Ok(())
    }

    /// Calls `register()` on every `Loaded` plugin, in discovery order,
    /// without touching the menu graph. Each plugin's operation lock is
    /// held only for its own call. Pair with [`Self::apply_registered`] to
    /// splice the results into a graph.
    pub async fn register_all(&self) -> Vec<(Id, Vec<RegistrationRequest>)> {
        let ids = self.order.lock().clone();
        let mut gathered = Vec::new();
        for id in ids {
            let Some(entry) = self.entry(&id) else {
                continue;
            };
            let _op = entry.op_lock.lock().await;
            let snapshot = entry.data.lock().clone();
            if snapshot.state != PluginState::Loaded {
                continue;
            }
            let driver = PluginDriver::new(&self.env);
            let entry_file = snapshot.path_entry_file();

            match driver
                .call(&id, &entry_file, &snapshot.path, "register")
                .await
            {
                Ok(value) => match serde_json::from_value::<Vec<RegistrationRequest>>(value) {
                    Ok(requests) => gathered.push((id, requests)),
                    Err(err) => {
                        warn!(plugin = %id, %err, "register() did not return a valid request list");
                        entry.data.lock().fail(err.to_string());
                    }
                },
                Err(err) => {
                    warn!(plugin = %id, %err, "register() call failed");
                    entry.data.lock().fail(err.to_string());
                }
            }
        }
        gathered
    }

    /// Applies the requests [`Self::register_all`] gathered into `graph`,
    /// recording each plugin's contributed IDs. A brief, synchronous splice;
    /// no subprocess work happens here.
    pub fn apply_registered(&self, graph: &mut MenuGraph, gathered: Vec<(Id, Vec<RegistrationRequest>)>) {
        for (id, requests) in gathered {
            let registered = apply_registration_requests(graph, &id, requests);
            if let Some(entry) = self.entry(&id) {
                let mut data = entry.data.lock();
                data.registered_ids = registered.into_iter().collect();
                data.state = PluginState::Registered;
            }
        }
    }

    /// Enables `id`: loads it if it is not already, leaving registration to
    /// a subsequent `register_all`/`apply_registered` pair.
    pub async fn enable(&self, id: &Id) -> Result<(), PluginError> {
        self.load(id).await
    }

    /// Disables `id`: runs `cleanup` and marks it `Disabled`. Returns the
    /// IDs it had registered, for the caller to splice out of the graph.
    pub async fn disable(&self, id: &Id) -> Result<Vec<Id>, PluginError> {
        let entry = self.entry(id).ok_or_else(|| PluginError::NotFound(id.clone()))?;
        let _op = entry.op_lock.lock().await;
        Ok(self.disable_locked(id, &entry).await)
    }

    /// The body of [`Self::disable`], assuming `entry`'s operation lock is
    /// already held by the caller.
    async fn disable_locked(&self, id: &Id, entry: &PluginEntry) -> Vec<Id> {
        let snapshot = entry.data.lock().clone();

        if matches!(snapshot.state, PluginState::Loaded | PluginState::Registered) {
            let driver = PluginDriver::new(&self.env);
            let entry_file = snapshot.path_entry_file();
            if let Err(err) = driver.call(id, &entry_file, &snapshot.path, "cleanup").await {
                warn!(plugin = %id, %err, "cleanup failed; disabling anyway");
            }
        }

        let registered_ids: Vec<Id> = snapshot.registered_ids.iter().cloned().collect();
        {
            let mut data = entry.data.lock();
            data.registered_ids.clear();
            data.state = PluginState::Disabled;
        }
        info!(plugin = %id, "plugin disabled");
        registered_ids
    }

    /// Disables `id`, forcibly discards its environment, and re-loads it
    /// from scratch. The only lifecycle path that unconditionally recreates
    /// the environment rather than trusting its freshness stamp. Returns the
    /// IDs the plugin had registered before the reload, for the caller to
    /// splice out of the graph (a subsequent `register_all` re-adds them).
    ///
    /// Runs as one operation against `id`'s lock: a concurrent `enable` or
    /// `disable` for the same plugin waits for the whole sequence, not just
    /// part of it.
    pub async fn reload(&self, id: &Id) -> Result<Vec<Id>, PluginError> {
        let entry = self.entry(id).ok_or_else(|| PluginError::NotFound(id.clone()))?;
        let _op = entry.op_lock.lock().await;

        let removed_ids = self.disable_locked(id, &entry).await;
        self.env.remove(id).await.map_err(|source| PluginError::Env {
            plugin: id.clone(),
            source,
        })?;
        self.load_locked(id, &entry).await?;
        Ok(removed_ids)
    }

    /// Removes `id` entirely: disables it, deletes its environment, and
    /// drops it from the registry. Returns the IDs it had registered, for
    /// the caller to splice out of the graph.
    ///
    /// Runs as one operation against `id`'s lock, same as [`Self::reload`].
    pub async fn uninstall(&self, id: &Id) -> Result<Vec<Id>, PluginError> {
        let entry = self.entry(id).ok_or_else(|| PluginError::NotFound(id.clone()))?;
        let _op = entry.op_lock.lock().await;

        let removed_ids = self.disable_locked(id, &entry).await;
        self.env.remove(id).await.map_err(|source| PluginError::Env {
            plugin: id.clone(),
            source,
        })?;
        entry.data.lock().state = PluginState::Removed;
        self.order.lock().retain(|existing| existing != id);
        info!(plugin = %id, "plugin uninstalled");
        Ok(removed_ids)
    }

    /// Looks up a plugin's current record.
    #[must_use]
    pub fn get(&self, id: &Id) -> Option<LoadedPlugin> {
        self.entry(id).map(|entry| entry.data.lock().clone())
    }

    /// Summarizes every known plugin, loaded or not, in discovery order.
    #[must_use]
    pub fn list(&self) -> Vec<PluginSummary> {
        let plugins = self.plugins.lock();
        self.order
            .lock()
            .iter()
            .filter_map(|id| plugins.get(id))
            .map(|entry| {
                let plugin = entry.data.lock();
                PluginSummary {
                    id: plugin.id.clone(),
                    loaded: matches!(
                        plugin.state,
                        PluginState::Loaded | PluginState::Registered
                    ),
                    enabled: !matches!(plugin.state, PluginState::Disabled),
                    info: plugin.info.clone(),
                    last_error: plugin.last_error.clone(),
                }
            })
            .collect()
    }
}

impl LoadedPlugin {
    fn path_entry_file(&self) -> PathBuf {
        match self.kind {
            crate::candidate::CandidateKind::Directory => {
                self.path.join("fastx_tui_plugin.py")
            }
            crate::candidate::CandidateKind::LegacyFile => self.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn id(s: &str) -> Id {
        Id::new(s).unwrap()
    }

    #[test]
    fn discover_populates_registry_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FastX-Tui-Plugin-Zeta.py"), b"").unwrap();
        fs::write(dir.path().join("FastX-Tui-Plugin-Alpha.py"), b"").unwrap();

        let registry = PluginRegistry::new(dir.path(), dir.path().join("envs"));
        let ids = registry.discover().unwrap();
        assert_eq!(
            ids,
            vec![id("FastX-Tui-Plugin-Alpha"), id("FastX-Tui-Plugin-Zeta")]
        );
        assert!(registry.get(&id("FastX-Tui-Plugin-Alpha")).is_some());
    }

    #[test]
    fn list_is_empty_before_discover() {
        let dir = tempfile::tempdir().unwrap();
        let registry = PluginRegistry::new(dir.path(), dir.path().join("envs"));
        assert!(registry.list().is_empty());
    }

    #[tokio::test]
    async fn disable_on_unknown_plugin_errors() {
        let dir = tempfile::tempdir().unwrap();
        let registry = PluginRegistry::new(dir.path(), dir.path().join("envs"));
        let result = registry.disable(&id("ghost")).await;
        assert!(matches!(result, Err(PluginError::NotFound(_))));
    }
}
