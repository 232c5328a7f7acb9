//! Subprocess driver: runs one plugin lifecycle method per call.
//!
//! Plugin code is never linked into this process. Each call generates a
//! small Python script that imports the plugin's entry module, locates the
//! single conforming class, instantiates it, invokes the requested method,
//! and prints one JSON line. Grounded in
//! `original_source/core/plugin_proxy.py::call_plugin_method`.

use std::path::Path;
use std::time::Duration;

use fastx_core::Id;
use fastx_env::EnvironmentManager;
use tracing::{debug, warn};

use crate::error::PluginError;

const REQUIRED_METHODS: &[&str] = ["get_info", "register", "initialize", "cleanup"].as_slice();

/// Default time allotted to a single lifecycle call before it is killed.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Invokes plugin lifecycle methods as one-shot subprocesses inside a
/// plugin's dependency environment.
pub struct PluginDriver<'a> {
    env: &'a EnvironmentManager,
}

impl<'a> PluginDriver<'a> {
    /// Creates a driver backed by `env`.
    #[must_use]
    pub fn new(env: &'a EnvironmentManager) -> Self {
        Self { env }
    }

    /// Calls `method_name` on the plugin at `entry_file`/`plugin_dir`,
    /// returning the JSON value of its `result` field.
    ///
    /// Methods take no arguments: `get_info`, `initialize`, `register`, and
    /// `cleanup` are all zero-argument per spec.
    pub async fn call(
        &self,
        plugin_id: &Id,
        entry_file: &Path,
        plugin_dir: &Path,
        method_name: &'static str,
    ) -> Result<serde_json::Value, PluginError> {
        let script = build_driver_script(entry_file, plugin_dir, method_name);
        let argv = vec!["-c".to_string(), script];

        let outcome = self
            .env
            .exec_in(plugin_id, &argv, Some(plugin_dir), DEFAULT_CALL_TIMEOUT)
            .await
            .map_err(|source| PluginError::Env {
                plugin: plugin_id.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&outcome.stdout);
        let last_line = stdout.lines().rev().find(|line| !line.trim().is_empty());

        let Some(line) = last_line else {
            warn!(plugin = %plugin_id, method = method_name, stderr = %String::from_utf8_lossy(&outcome.stderr), "plugin produced no output");
            return Err(PluginError::InvocationFailed {
                plugin: plugin_id.clone(),
                method: method_name,
                detail: format!(
                    "no output (exit {}); stderr: {}",
                    outcome.exit_code,
                    String::from_utf8_lossy(&outcome.stderr)
                ),
            });
        };

        let envelope: serde_json::Value =
            serde_json::from_str(line).map_err(|err| PluginError::InvocationFailed {
                plugin: plugin_id.clone(),
                method: method_name,
                detail: format!("could not parse output as JSON: {err}"),
            })?;

        if let Some(error) = envelope.get("error") {
            return Err(PluginError::InvocationFailed {
                plugin: plugin_id.clone(),
                method: method_name,
                detail: error.as_str().unwrap_or("unknown error").to_string(),
            });
        }

        debug!(plugin = %plugin_id, method = method_name, "lifecycle call succeeded");
        Ok(envelope.get("result").cloned().unwrap_or(serde_json::Value::Null))
    }
}

fn build_driver_script(entry_file: &Path, plugin_dir: &Path, method_name: &str) -> String {
    let entry_file_json = serde_json::to_string(&entry_file.display().to_string())
        .expect("path string always serializes");
    let plugin_dir_json = serde_json::to_string(&plugin_dir.display().to_string())
        .expect("path string always serializes");
    let method_json =
        serde_json::to_string(method_name).expect("method name always serializes");
    let required_methods_json =
        serde_json::to_string(REQUIRED_METHODS).expect("method list always serializes");

    format!(
        r#"
import sys, json, importlib.util

entry_file = {entry_file_json}
plugin_dir = {plugin_dir_json}
method_name = {method_json}
required = {required_methods_json}

spec = importlib.util.spec_from_file_location("fastx_tui_plugin", entry_file)
module = importlib.util.module_from_spec(spec)
sys.path.insert(0, plugin_dir)
spec.loader.exec_module(module)

candidates = []
for attr_name in dir(module):
    attr = getattr(module, attr_name)
    if isinstance(attr, type) and all(hasattr(attr, m) for m in required):
        candidates.append(attr)

if len(candidates) != 1:
    print(json.dumps({{"error": f"expected exactly one plugin class, found {{len(candidates)}}"}}))
    sys.exit(1)

plugin = candidates[0]()
plugin.plugin_path = plugin_dir

try:
    method = getattr(plugin, method_name)
    result = method()
    print(json.dumps({{"result": result}}))
except Exception as exc:
    print(json.dumps({{"error": str(exc)}}))
    sys.exit(1)
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_script_embeds_escaped_paths() {
        let script = build_driver_script(
            Path::new("/plugins/Demo \"quote\"/fastx_tui_plugin.py"),
            Path::new("/plugins/Demo \"quote\""),
            "get_info",
        );
        assert!(script.contains(r#"entry_file = "/plugins/Demo \"quote\"/fastx_tui_plugin.py""#));
        assert!(script.contains(r#"method_name = "get_info""#));
    }
}
