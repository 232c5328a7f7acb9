//! S1 — Fresh install: a single enabled plugin with one action is fully
//! loaded and registered by `startup`.

mod common;

use fastx_config::ConfigStore;
use fastx_core::Id;
use fastx_runtime::Runtime;
use fastx_update::{LaunchKind, UpdateManager};
use std::path::PathBuf;

fn id(s: &str) -> Id {
    Id::new(s).unwrap()
}

#[tokio::test]
async fn fresh_install_loads_and_registers_one_plugin() {
    let temp = tempfile::tempdir().unwrap();
    let plugins_dir = temp.path().join("plugins");
    std::fs::create_dir_all(&plugins_dir).unwrap();
    common::write_plugin(&plugins_dir, "Alpha", "1.0.0", true);

    let config = ConfigStore::open_in_memory().unwrap();
    let updates = UpdateManager::new(
        "fastxteam/FastX-Tui",
        "0.1.0",
        PathBuf::from("/opt/fastx-tui"),
        LaunchKind::Native,
    );
    let runtime = Runtime::new(config, &plugins_dir, temp.path().join("envs"), updates);

    runtime.startup().await.unwrap();

    let plugins = runtime.list_plugins().await;
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].id, id("FastX-Tui-Plugin-Alpha"));
    assert!(plugins[0].loaded);

    let plugin_children = runtime.children_of(&id("plugins_menu")).await;
    assert_eq!(plugin_children, vec![id("alpha_hello")]);

    let main_children = runtime.children_of(&id("main_menu")).await;
    assert!(main_children.contains(&id("plugins_menu")));
}
