//! Platform token and asset-matching rules.

use crate::types::ReleaseAsset;

/// The running platform, as relevant to asset selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Windows: matches assets ending in `.exe`.
    Windows,
    /// Linux: matches extensionless assets or ones ending in `-linux`.
    Linux,
}

impl Platform {
    /// Detects the platform this binary was compiled for.
    #[must_use]
    pub fn current() -> Option<Self> {
        if cfg!(windows) {
            Some(Platform::Windows)
        } else if cfg!(target_os = "linux") {
            Some(Platform::Linux)
        } else {
            None
        }
    }

    /// Token used to build fallback download URLs.
    #[must_use]
    pub fn token(self) -> &'static str {
        match self {
            Platform::Windows => "win",
            Platform::Linux => "linux",
        }
    }
}

const EXCLUDED_KEYWORDS: &[&str] = &["source", "src", ".zip", ".tar", ".gz", ".7z", ".whl"];

/// Picks the asset matching `platform` from `assets`, per spec's matching
/// rules (extension/suffix match, excluding source archives and installer
/// packages). Grounded in
/// `original_source/core/update_manager.py::_get_exe_download_url`.
#[must_use]
pub fn select_asset(platform: Platform, assets: &[ReleaseAsset]) -> Option<ReleaseAsset> {
    assets
        .iter()
        .find(|asset| {
            let name = asset.name.to_lowercase();
            let matches_platform = match platform {
                Platform::Windows => name.ends_with(".exe"),
                Platform::Linux => !name.contains('.') || name.ends_with("-linux"),
            };
            matches_platform && !EXCLUDED_KEYWORDS.iter().any(|kw| name.contains(kw))
        })
        .cloned()
}

/// Builds a fallback URL by convention when no asset list is available.
#[must_use]
pub fn fallback_download_url(platform: Platform, version: &str) -> String {
    let mut base_name = format!("fastx-tui-{}", platform.token());
    if platform == Platform::Windows {
        base_name.push_str(".exe");
    }
    format!(
        "https://github.com/fastxteam/FastX-Tui/releases/download/v{version}/{base_name}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> ReleaseAsset {
        ReleaseAsset {
            name: name.to_string(),
            browser_download_url: format!("https://example.com/{name}"),
        }
    }

    #[test]
    fn picks_windows_exe() {
        let assets = vec![asset("fastx-tui-linux"), asset("fastx-tui-win.exe")];
        let picked = select_asset(Platform::Windows, &assets).unwrap();
        assert_eq!(picked.name, "fastx-tui-win.exe");
    }

    #[test]
    fn excludes_source_archives() {
        let assets = vec![asset("source-code.zip"), asset("fastx-tui-linux")];
        let picked = select_asset(Platform::Linux, &assets).unwrap();
        assert_eq!(picked.name, "fastx-tui-linux");
    }

    #[test]
    fn returns_none_without_a_match() {
        let assets = vec![asset("fastx-tui.whl")];
        assert!(select_asset(Platform::Linux, &assets).is_none());
    }

    #[test]
    fn fallback_url_is_platform_specific() {
        let url = fallback_download_url(Platform::Windows, "1.2.3");
        assert!(url.ends_with("fastx-tui-win.exe"));
    }
}
