//! The Lifecycle Controller: composes Config, Environment, Registry, Graph,
//! and Update behind one process-wide `Runtime` facade.

use std::path::PathBuf;

use fastx_config::ConfigStore;
use fastx_core::Id;
use fastx_menu::{MenuGraph, Router};
use fastx_plugins::{PluginRegistry, PluginSummary};
use fastx_update::{CheckResult, UpdateManager};
use parking_lot::Mutex;
use tracing::{info, info_span, warn, Instrument};

use crate::error::LifecycleError;
use crate::system_menu::{self, PLUGINS_MENU_ID};

const MAIN_MENU_ID: &str = "main_menu";

fn id(s: &str) -> Id {
    Id::new(s).expect("static ids are valid identifiers")
}

/// The graph and its derived router, spliced together under one short-held
/// lock. Never held across an `await`: plugin subprocess calls run against
/// [`PluginRegistry`]'s own per-plugin locks, and only touch this state to
/// gather or apply results.
struct GraphState {
    graph: MenuGraph,
    router: Router,
}

impl GraphState {
    fn rebuild_router(&mut self) {
        self.router.rebuild(&self.graph);
    }
}

/// Composes the Config Store, Environment Manager (via the registry), Plugin
/// Registry, Menu Graph, Router, and Update Manager into the application's
/// single entry point for plugin lifecycle operations.
///
/// Per spec.md's "Across plugins, operations are independent" guarantee,
/// two different plugins' lifecycle calls never block each other: the
/// registry serializes only per-plugin, and the graph/router lock is held
/// only for the brief, synchronous splice step, never across a subprocess
/// call.
pub struct Runtime {
    config: ConfigStore,
    plugin_dir: PathBuf,
    updates: UpdateManager,
    registry: PluginRegistry,
    state: Mutex<GraphState>,
}

impl Runtime {
    /// Creates a runtime rooted at `plugin_dir`, with per-plugin
    /// environments under `env_base_dir`, config persisted at
    /// `config_path`, and updates polled via `updates`.
    pub fn new(
        config: ConfigStore,
        plugin_dir: impl Into<PathBuf>,
        env_base_dir: impl Into<PathBuf>,
        updates: UpdateManager,
    ) -> Self {
        let plugin_dir = plugin_dir.into();
        Self {
            config,
            plugin_dir: plugin_dir.clone(),
            updates,
            registry: PluginRegistry::new(plugin_dir, env_base_dir),
            state: Mutex::new(GraphState {
                graph: MenuGraph::new(),
                router: Router::new(),
            }),
        }
    }

    /// The config store, for read access by the view layer.
    #[must_use]
    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// The update manager, for read access and manual checks by the view
    /// layer.
    #[must_use]
    pub fn updates(&self) -> &UpdateManager {
        &self.updates
    }

    /// Every known plugin, loaded or not, in discovery order.
    pub async fn list_plugins(&self) -> Vec<PluginSummary> {
        self.registry.list()
    }

    /// The enabled children of `menu_id`, in insertion order, for the view
    /// layer to render.
    pub async fn children_of(&self, menu_id: &Id) -> Vec<Id> {
        self.state
            .lock()
            .graph
            .children_of(menu_id)
            .into_iter()
            .map(|entity| entity.id().clone())
            .collect()
    }

    /// The current node on the navigation stack.
    pub async fn current(&self) -> Id {
        self.state.lock().graph.current().clone()
    }

    /// Navigates to `menu_id`, pushing it onto the navigation stack.
    pub async fn navigate_to(&self, menu_id: &Id) -> Result<(), LifecycleError> {
        self.state.lock().graph.navigate_to(menu_id)?;
        Ok(())
    }

    /// Pops the navigation stack, returning the new current node.
    pub async fn go_back(&self) -> Id {
        self.state.lock().graph.go_back().clone()
    }

    /// The breadcrumb trail from the root down to `menu_id`, inclusive.
    pub async fn breadcrumbs(&self, menu_id: &Id) -> Result<Vec<Id>, LifecycleError> {
        Ok(self.state.lock().router.breadcrumbs(menu_id)?)
    }

    /// Builds the system menu subtree, discovers and loads every enabled
    /// plugin, registers their contributions, and rebuilds the router. If
    /// `auto_check_updates` is set, kicks off a non-blocking release check
    /// whose result surfaces later via [`Runtime::update_hint`].
    pub async fn startup(&self) -> Result<(), LifecycleError> {
        let span = info_span!("startup");
        async {
            {
                let mut state = self.state.lock();
                system_menu::build(&mut state.graph)?;
            }

            let ids = self
                .registry
                .discover()
                .map_err(|err| LifecycleError::Discovery(err.to_string()))?;

            let enabled_ids: Vec<Id> = {
                let app = self.config.app();
                if !app.plugin_auto_load {
                    Vec::new()
                } else {
                    ids.into_iter()
                        .filter(|plugin_id| {
                            self.config
                                .get_plugin(plugin_id.as_str())
                                .get("enabled")
                                .and_then(serde_json::Value::as_bool)
                                .unwrap_or(true)
                        })
                        .collect()
                }
            };

            for plugin_id in &enabled_ids {
                if let Err(err) = self.registry.load(plugin_id).await {
                    warn!(plugin = %plugin_id, %err, "plugin failed to load during startup");
                }
            }

            self.register_and_splice().await?;

            info!("startup complete");
            Ok(())
        }
        .instrument(span)
        .await
    }

    /// Issues a non-blocking update check if the app config has
    /// `auto_check_updates` set. Errors are logged, not propagated; callers
    /// observe the outcome through [`UpdateManager::update_available`] /
    /// [`UpdateManager::version_check_failed`].
    pub async fn maybe_check_updates(&self) -> Option<CheckResult> {
        if !self.config.app().auto_check_updates {
            return None;
        }
        match self.updates.check(false).await {
            Ok(result) => Some(result),
            Err(err) => {
                warn!(%err, "startup update check failed");
                None
            }
        }
    }

    /// Enables `id`: persists `enabled=true`, loads the plugin if it isn't
    /// already, registers it, and rebuilds the plugin subtree and router.
    pub async fn enable(&self, plugin_id: &Id) -> Result<(), LifecycleError> {
        self.config
            .update_plugin(plugin_id.as_str(), "enabled", serde_json::Value::Bool(true))?;

        self.registry.load(plugin_id).await?;
        self.register_and_splice().await?;
        info!(plugin = %plugin_id, "plugin enabled");
        Ok(())
    }

    /// Disables `id`: persists `enabled=false`, runs the plugin's cleanup,
    /// removes its contributed IDs from the graph, and rebuilds the plugin
    /// subtree and router. The plugin's environment is left in place.
    pub async fn disable(&self, plugin_id: &Id) -> Result<(), LifecycleError> {
        self.config.update_plugin(
            plugin_id.as_str(),
            "enabled",
            serde_json::Value::Bool(false),
        )?;

        let removed_ids = self.registry.disable(plugin_id).await?;
        self.splice_removed(&removed_ids)?;
        info!(plugin = %plugin_id, "plugin disabled");
        Ok(())
    }

    /// Reloads `id`: disables it, forcibly discards and recreates its
    /// environment, loads it, registers it, and rebuilds the plugin subtree
    /// and router. The only path that unconditionally refreshes the
    /// environment rather than trusting its freshness stamp.
    pub async fn reload(&self, plugin_id: &Id) -> Result<(), LifecycleError> {
        let removed_ids = self.registry.reload(plugin_id).await?;
        self.splice_removed(&removed_ids)?;
        self.register_and_splice().await?;
        info!(plugin = %plugin_id, "plugin reloaded");
        Ok(())
    }

    /// Uninstalls `id` entirely: disables it, removes its environment and
    /// source directory, drops its config entry, and rebuilds the plugin
    /// subtree and router.
    pub async fn uninstall(&self, plugin_id: &Id) -> Result<(), LifecycleError> {
        let removed_ids = self.registry.uninstall(plugin_id).await?;
        self.splice_removed(&removed_ids)?;

        let plugin_path = self.plugin_dir.join(plugin_id.as_str());
        if plugin_path.exists() {
            let path = plugin_path.clone();
            tokio::task::spawn_blocking(move || remove_plugin_directory(&path))
                .await
                .expect("blocking task panicked")
                .map_err(|detail| LifecycleError::DirectoryRemoval {
                    plugin: plugin_id.clone(),
                    detail,
                })?;
        }

        self.config.remove_plugin(plugin_id.as_str())?;
        info!(plugin = %plugin_id, "plugin uninstalled");
        Ok(())
    }

    /// Calls `register()` on every loaded plugin (no graph lock held across
    /// those subprocess calls), then splices the results into the graph
    /// under one brief, synchronous lock.
    async fn register_and_splice(&self) -> Result<(), LifecycleError> {
        let gathered = self.registry.register_all().await;
        let mut state = self.state.lock();
        self.registry.apply_registered(&mut state.graph, gathered);
        rebuild_plugin_subtree(&mut state.graph)?;
        state.rebuild_router();
        Ok(())
    }

    /// Removes `removed_ids` from the graph and rebuilds the plugin subtree
    /// and router, all under one brief, synchronous lock.
    fn splice_removed(&self, removed_ids: &[Id]) -> Result<(), LifecycleError> {
        let mut state = self.state.lock();
        for removed_id in removed_ids {
            if let Err(err) = state.graph.remove_item(removed_id) {
                warn!(id = %removed_id, %err, "failed to remove registered item during splice");
            }
        }
        rebuild_plugin_subtree(&mut state.graph)?;
        state.rebuild_router();
        Ok(())
    }
}

/// Clears `plugins_menu`'s children and reattaches every currently
/// registered, non-system entity that is not `plugins_menu` itself. Attaches
/// `plugins_menu` to `main_menu` if it ends up non-empty, otherwise detaches
/// it. Safe to call repeatedly with no changes.
fn rebuild_plugin_subtree(graph: &mut MenuGraph) -> Result<(), fastx_menu::MenuError> {
    let plugins_menu_id = id(PLUGINS_MENU_ID);
    let main_menu_id = id(MAIN_MENU_ID);

    graph.clear_children(&plugins_menu_id)?;

    let contributed: Vec<Id> = graph
        .entities()
        .filter(|entity| !entity.is_system() && entity.id() != &plugins_menu_id)
        .map(|entity| entity.id().clone())
        .collect();

    for entity_id in &contributed {
        graph.add_child(&plugins_menu_id, entity_id)?;
    }

    if contributed.is_empty() {
        graph.detach_child(&main_menu_id, &plugins_menu_id)?;
    } else {
        graph.add_child(&main_menu_id, &plugins_menu_id)?;
    }

    Ok(())
}

fn remove_plugin_directory(path: &std::path::Path) -> Result<(), String> {
    clear_readonly_recursive(path).map_err(|err| err.to_string())?;
    std::fs::remove_dir_all(path).map_err(|err| err.to_string())
}

fn clear_readonly_recursive(path: &std::path::Path) -> std::io::Result<()> {
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
    use fastx_menu::{ActionItem, ActionPayload, MenuKind, MenuNode};

    #[test]
    fn rebuild_plugin_subtree_attaches_non_system_entities() {
        let mut graph = MenuGraph::new();
        system_menu::build(&mut graph).unwrap();
        graph
            .register_action(ActionItem::new(
                id("alpha_hello"),
                "Hello",
                ActionPayload::Shell("echo hi".into()),
            ))
            .unwrap();

        rebuild_plugin_subtree(&mut graph).unwrap();

        let plugin_children: Vec<_> = graph
            .children_of(&id(PLUGINS_MENU_ID))
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        assert_eq!(plugin_children, vec![id("alpha_hello")]);

        let main_children: Vec<_> = graph
            .children_of(&id(MAIN_MENU_ID))
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        assert!(main_children.contains(&id(PLUGINS_MENU_ID)));
    }

    #[test]
    fn rebuild_plugin_subtree_detaches_when_empty() {
        let mut graph = MenuGraph::new();
        system_menu::build(&mut graph).unwrap();
        rebuild_plugin_subtree(&mut graph).unwrap();
        let main_children: Vec<_> = graph
            .children_of(&id(MAIN_MENU_ID))
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        assert!(!main_children.contains(&id(PLUGINS_MENU_ID)));
    }

    #[test]
    fn rebuild_plugin_subtree_is_idempotent() {
        let mut graph = MenuGraph::new();
        system_menu::build(&mut graph).unwrap();
        graph
            .register_node(MenuNode::new(id("demo_menu"), "Demo", MenuKind::Sub))
            .unwrap();

        rebuild_plugin_subtree(&mut graph).unwrap();
        let first: Vec<_> = graph
            .children_of(&id(PLUGINS_MENU_ID))
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        rebuild_plugin_subtree(&mut graph).unwrap();
        let second: Vec<_> = graph
            .children_of(&id(PLUGINS_MENU_ID))
            .into_iter()
            .map(|e| e.id().clone())
            .collect();
        assert_eq!(first, second);
    }
}
