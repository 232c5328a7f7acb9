//! Plugin-declared metadata and its schema validation.

use serde::{Deserialize, Serialize};

/// Metadata a plugin returns from `get_info`, validated before `initialize`
/// is called.
///
/// `version` must match `^\d+\.\d+\.\d+$`; `homepage`/`repository`, when
/// present, must be syntactically valid URLs. Mirrors
/// `original_source/models/plugin_schema.py::PluginInfoSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Display name.
    pub name: String,
    /// Declared version, strict `x.y.z`.
    pub version: String,
    /// Declared author.
    #[serde(default)]
    pub author: Option<String>,
    /// Declared description.
    #[serde(default)]
    pub description: Option<String>,
    /// Declared homepage URL.
    #[serde(default)]
    pub homepage: Option<String>,
    /// Declared repository URL.
    #[serde(default)]
    pub repository: Option<String>,
    /// Declared license identifier.
    #[serde(default)]
    pub license: Option<String>,
    /// Declared category.
    #[serde(default)]
    pub category: Option<String>,
    /// Declared tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Declared dependency names (informational; actual dependency
    /// resolution is handled by the Environment Manager from the plugin's
    /// own manifest).
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Whether the plugin should be loaded.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl PluginInfo {
    /// Validates the version format and any present URLs. Returns the
    /// combined list of validation failures, if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !is_semver_triple(&self.version) {
            errors.push(format!(
                "version {:?} does not match x.y.z",
                self.version
            ));
        }
        if let Some(url) = &self.homepage {
            if !is_plausible_url(url) {
                errors.push(format!("homepage {url:?} is not a valid URL"));
            }
        }
        if let Some(url) = &self.repository {
            if !is_plausible_url(url) {
                errors.push(format!("repository {url:?} is not a valid URL"));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_semver_triple(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

fn is_plausible_url(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    (scheme == "http" || scheme == "https") && !rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PluginInfo {
        PluginInfo {
            name: "Demo".into(),
            version: "1.0.0".into(),
            author: None,
            description: None,
            homepage: Some("https://example.com".into()),
            repository: None,
            license: None,
            category: None,
            tags: Vec::new(),
            dependencies: Vec::new(),
            enabled: true,
        }
    }

    #[test]
    fn accepts_well_formed_info() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_non_semver_version() {
        let mut info = sample();
        info.version = "1.0".into();
        assert!(info.validate().is_err());
    }

    #[test]
    fn rejects_malformed_url() {
        let mut info = sample();
        info.homepage = Some("not-a-url".into());
        assert!(info.validate().is_err());
    }

    #[test]
    fn enabled_defaults_true_when_absent() {
        let value = serde_json::json!({
            "name": "Demo",
            "version": "1.0.0",
        });
        let info: PluginInfo = serde_json::from_value(value).unwrap();
        assert!(info.enabled);
    }
}
