//! S3 — Disable then re-enable: disabling detaches `plugins_menu` from
//! `main_menu` without destroying the plugin's environment; re-enabling
//! restores the pre-disable graph.

mod common;

use fastx_config::ConfigStore;
use fastx_core::Id;
use fastx_env::EnvironmentManager;
use fastx_runtime::Runtime;
use fastx_update::{LaunchKind, UpdateManager};
use std::path::PathBuf;

fn id(s: &str) -> Id {
    Id::new(s).unwrap()
}

#[tokio::test]
async fn disable_detaches_and_enable_restores() {
    let temp = tempfile::tempdir().unwrap();
    let plugins_dir = temp.path().join("plugins");
    std::fs::create_dir_all(&plugins_dir).unwrap();
    common::write_plugin(&plugins_dir, "Alpha", "1.0.0", true);
    let env_dir = temp.path().join("envs");

    let config = ConfigStore::open_in_memory().unwrap();
    let updates = UpdateManager::new(
        "fastxteam/FastX-Tui",
        "0.1.0",
        PathBuf::from("/opt/fastx-tui"),
        LaunchKind::Native,
    );
    let runtime = Runtime::new(config, &plugins_dir, &env_dir, updates);
    runtime.startup().await.unwrap();

    let plugin_id = id("FastX-Tui-Plugin-Alpha");
    runtime.disable(&plugin_id).await.unwrap();

    let main_children = runtime.children_of(&id("main_menu")).await;
    assert!(!main_children.contains(&id("plugins_menu")));

    let env = EnvironmentManager::new(&env_dir);
    assert!(env.exists(&plugin_id));

    runtime.enable(&plugin_id).await.unwrap();

    let main_children = runtime.children_of(&id("main_menu")).await;
    assert!(main_children.contains(&id("plugins_menu")));
    let plugin_children = runtime.children_of(&id("plugins_menu")).await;
    assert_eq!(plugin_children, vec![id("alpha_hello")]);
}
