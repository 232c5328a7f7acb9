//! S4 — Reload after manifest change: touching a plugin's manifest makes
//! its environment stale; `reload` forces a recreate, restoring freshness.

mod common;

use fastx_config::ConfigStore;
use fastx_core::Id;
use fastx_env::EnvironmentManager;
use fastx_runtime::Runtime;
use fastx_update::{LaunchKind, UpdateManager};
use std::path::PathBuf;
use std::time::Duration;

fn id(s: &str) -> Id {
    Id::new(s).unwrap()
}

#[tokio::test]
async fn reload_recreates_stale_environment() {
    let temp = tempfile::tempdir().unwrap();
    let plugins_dir = temp.path().join("plugins");
    std::fs::create_dir_all(&plugins_dir).unwrap();
    let plugin_dir = common::write_plugin(&plugins_dir, "Alpha", "1.0.0", true);
    std::fs::write(plugin_dir.join("pyproject.toml"), "[project]\nname = \"alpha\"\n").unwrap();
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
    let env = EnvironmentManager::new(&env_dir);
    assert!(env.is_fresh(&plugin_id, &plugin_dir));

    // Ensure the manifest's new mtime is observably newer than the
    // environment's.
    std::thread::sleep(Duration::from_millis(20));
    std::fs::write(
        plugin_dir.join("pyproject.toml"),
        "[project]\nname = \"alpha\"\nversion = \"2\"\n",
    )
    .unwrap();
    assert!(!env.is_fresh(&plugin_id, &plugin_dir));

    runtime.reload(&plugin_id).await.unwrap();

    assert!(env.is_fresh(&plugin_id, &plugin_dir));
}
