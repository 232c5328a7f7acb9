//! Filesystem discovery of plugin candidates.

use std::fs;
use std::path::{Path, PathBuf};

use fastx_core::Id;

const NAME_PREFIX: &str = "FastX-Tui-Plugin-";
const ENTRY_FILE: &str = "fastx_tui_plugin.py";

/// Whether a candidate is a directory-style plugin (with its own manifest
/// and entry module) or a legacy single-file plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    /// A `FastX-Tui-Plugin-<Name>/` directory containing `fastx_tui_plugin.py`.
    Directory,
    /// A legacy `FastX-Tui-Plugin-<Name>.py` single file.
    LegacyFile,
}

/// A filesystem entry that looks like a plugin, prior to loading.
#[derive(Debug, Clone)]
pub struct PluginCandidate {
    /// The plugin's identifier, derived from its directory/file name with
    /// the prefix and extension stripped.
    pub id: Id,
    /// Absolute path to the plugin's directory (directory candidates) or
    /// file (legacy candidates).
    pub path: PathBuf,
    /// Directory vs. legacy-file.
    pub kind: CandidateKind,
}

impl PluginCandidate {
    /// The path of the entry module to execute: `path/fastx_tui_plugin.py`
    /// for directory candidates, `path` itself for legacy candidates.
    #[must_use]
    pub fn entry_file(&self) -> PathBuf {
        match self.kind {
            CandidateKind::Directory => self.path.join(ENTRY_FILE),
            CandidateKind::LegacyFile => self.path.clone(),
        }
    }
}

/// Scans `plugin_dir` for candidates, returning them sorted by ID for
/// deterministic discovery order. Non-conforming entries are silently
/// ignored.
pub fn discover(plugin_dir: &Path) -> std::io::Result<Vec<PluginCandidate>> {
    let mut candidates = Vec::new();
    if !plugin_dir.is_dir() {
        return Ok(candidates);
    }
    for entry in fs::read_dir(plugin_dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        if path.is_dir() {
            let Some(suffix) = name.strip_prefix(NAME_PREFIX) else {
                continue;
            };
            if suffix.is_empty() || !path.join(ENTRY_FILE).is_file() {
                continue;
            }
            let Ok(id) = Id::new(name) else { continue };
            candidates.push(PluginCandidate {
                id,
                path,
                kind: CandidateKind::Directory,
            });
        } else if path.is_file() {
            let Some(suffix) = name.strip_prefix(NAME_PREFIX) else {
                continue;
            };
            let Some(stem) = suffix.strip_suffix(".py") else {
                continue;
            };
            if stem.is_empty() {
                continue;
            }
            let full_name = &name[..name.len() - 3];
            let Ok(id) = Id::new(full_name) else { continue };
            candidates.push(PluginCandidate {
                id,
                path,
                kind: CandidateKind::LegacyFile,
            });
        }
    }
    candidates.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovers_directory_candidate_with_entry_file() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("FastX-Tui-Plugin-Demo");
        fs::create_dir_all(&plugin_dir).unwrap();
        fs::write(plugin_dir.join(ENTRY_FILE), b"").unwrap();

        let candidates = discover(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, CandidateKind::Directory);
        assert_eq!(candidates[0].id.as_str(), "FastX-Tui-Plugin-Demo");
    }

    #[test]
    fn ignores_directory_without_entry_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("FastX-Tui-Plugin-Empty")).unwrap();
        assert!(discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn discovers_legacy_file_candidate() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FastX-Tui-Plugin-Old.py"), b"").unwrap();
        let candidates = discover(dir.path()).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].kind, CandidateKind::LegacyFile);
        assert_eq!(candidates[0].id.as_str(), "FastX-Tui-Plugin-Old");
    }

    #[test]
    fn ignores_non_matching_names() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("__init__.py"), b"").unwrap();
        fs::write(dir.path().join("not_a_plugin.py"), b"").unwrap();
        assert!(discover(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn discovery_order_is_sorted_by_id() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("FastX-Tui-Plugin-Zeta.py"), b"").unwrap();
        fs::write(dir.path().join("FastX-Tui-Plugin-Alpha.py"), b"").unwrap();
        let candidates = discover(dir.path()).unwrap();
        assert_eq!(candidates[0].id.as_str(), "FastX-Tui-Plugin-Alpha");
        assert_eq!(candidates[1].id.as_str(), "FastX-Tui-Plugin-Zeta");
    }
}
