//! Shared fixtures for Lifecycle Controller integration tests: writes a
//! minimal, deterministic plugin entry module to a temp plugins directory.

use std::path::Path;

/// Writes `FastX-Tui-Plugin-<name>/fastx_tui_plugin.py` under `plugins_dir`,
/// declaring one action whose id is `<name_lower>_hello`. `enabled` and
/// `version` are embedded verbatim so tests can exercise S6's bad-metadata
/// path by passing a non-semver version string.
pub fn write_plugin(plugins_dir: &Path, name: &str, version: &str, enabled: bool) -> std::path::PathBuf {
    let dir = plugins_dir.join(format!("FastX-Tui-Plugin-{name}"));
    std::fs::create_dir_all(&dir).unwrap();
    let action_id = format!("{}_hello", name.to_lowercase());
    let enabled_py = if enabled { "True" } else { "False" };
    std::fs::write(
        dir.join("fastx_tui_plugin.py"),
        format!(
            r#"
class Plugin:
    def get_info(self):
        return {{
            "name": "{name}",
            "version": "{version}",
            "enabled": {enabled_py},
        }}

    def initialize(self):
        return None

    def register(self):
        return [
            {{
                "kind": "action",
                "id": "{action_id}",
                "parent": "plugins_menu",
                "name": "{name} Hello",
                "payload": {{"type": "shell", "command": "echo hello"}},
            }}
        ]

    def cleanup(self):
        return None
"#
        ),
    )
    .unwrap();
    dir
}
