//! Typed schemas for the app config and user preference namespaces.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// `banner_style`: `default` or `gradient`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerStyle {
    /// Plain banner.
    Default,
    /// Gradient-rendered banner.
    Gradient,
}

/// `color_scheme`: `auto`, `light`, or `dark`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    /// Follow the terminal's reported scheme.
    Auto,
    /// Force light.
    Light,
    /// Force dark.
    Dark,
}

/// `log_level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Verbose diagnostic output.
    Debug,
    /// Routine operational messages.
    Info,
    /// Recoverable problems.
    Warning,
    /// Operation-affecting failures.
    Error,
    /// Unrecoverable failures.
    Critical,
}

/// `default_view`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultView {
    /// Tabular listing.
    Table,
    /// Flat list.
    List,
    /// Icon grid.
    Grid,
}

/// Application-wide configuration. Mirrors
/// `original_source/models/config_schema.py::AppConfigSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Show the startup banner.
    pub show_banner: bool,
    /// Show contextual hints.
    pub show_hints: bool,
    /// Show menu icons.
    pub show_icons: bool,
    /// Enable UI animation.
    pub animation_enabled: bool,
    /// Banner rendering style.
    pub banner_style: BannerStyle,
    /// Clear the screen automatically between menus.
    pub auto_clear_screen: bool,
    /// Ask for confirmation before exiting.
    pub confirm_exit: bool,
    /// Ask for confirmation before destructive actions.
    pub confirm_dangerous_commands: bool,
    /// Seconds allowed for a single action invocation. Bound: 5..=300.
    pub command_timeout: u32,
    /// Cap applied to `search_history`/`recently_used`. Bound: 10..=200.
    pub max_history_items: u32,
    /// Cap applied to search result listings. Bound: 5..=100.
    pub max_search_results: u32,
    /// Active theme name.
    pub theme: String,
    /// Active color scheme.
    pub color_scheme: ColorScheme,
    /// Automatically load discovered plugins at startup.
    pub plugin_auto_load: bool,
    /// Directory scanned for plugins.
    pub plugin_directory: String,
    /// Language code, `xx` or `xx_XX`.
    pub language: String,
    /// Minimum severity logged.
    pub log_level: LogLevel,
    /// Enable anonymous usage analytics.
    pub enable_analytics: bool,
    /// Show the first-run welcome page.
    pub show_welcome_page: bool,
    /// Check for updates automatically on startup.
    pub auto_check_updates: bool,
    /// Run long actions on the async task pool instead of blocking.
    pub use_async_tasks: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            show_banner: true,
            show_hints: true,
            show_icons: true,
            animation_enabled: true,
            banner_style: BannerStyle::Default,
            auto_clear_screen: true,
            confirm_exit: false,
            confirm_dangerous_commands: true,
            command_timeout: 30,
            max_history_items: 50,
            max_search_results: 20,
            theme: "default".to_string(),
            color_scheme: ColorScheme::Auto,
            plugin_auto_load: true,
            plugin_directory: "plugins".to_string(),
            language: "en_US".to_string(),
            log_level: LogLevel::Info,
            enable_analytics: false,
            show_welcome_page: true,
            auto_check_updates: true,
            use_async_tasks: false,
        }
    }
}

impl AppConfig {
    /// Validates bound and pattern constraints, collecting every failure
    /// rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if !(5..=300).contains(&self.command_timeout) {
            errors.push(format!(
                "command_timeout {} out of range 5..=300",
                self.command_timeout
            ));
        }
        if !(10..=200).contains(&self.max_history_items) {
            errors.push(format!(
                "max_history_items {} out of range 10..=200",
                self.max_history_items
            ));
        }
        if !(5..=100).contains(&self.max_search_results) {
            errors.push(format!(
                "max_search_results {} out of range 5..=100",
                self.max_search_results
            ));
        }
        if !is_language_code(&self.language) {
            errors.push(format!(
                "language {:?} is not a valid xx or xx_XX code",
                self.language
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn is_language_code(value: &str) -> bool {
    let bytes = value.as_bytes();
    let is_lower_pair =
        |s: &[u8]| s.len() == 2 && s.iter().all(|b| b.is_ascii_alphabetic());
    match bytes.len() {
        2 => is_lower_pair(bytes),
        5 => {
            is_lower_pair(&bytes[..2])
                && bytes[2] == b'_'
                && bytes[3..5].iter().all(|b| b.is_ascii_uppercase())
        }
        _ => false,
    }
}

/// Per-user preferences: favorites, history, shortcuts, and view defaults.
/// Mirrors `original_source/models/config_schema.py::UserPreferencesSchema`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Favorited menu/action IDs, most-recently-added last.
    pub favorite_items: Vec<String>,
    /// Recently invoked item IDs, most-recent first. Capped at
    /// `AppConfig::max_history_items`.
    pub recently_used: VecDeque<String>,
    /// Past search keywords, oldest first. Capped at
    /// `AppConfig::max_history_items`.
    pub search_history: VecDeque<String>,
    /// Custom key-binding overrides.
    pub custom_shortcuts: std::collections::HashMap<String, String>,
    /// Menu shown on startup.
    pub preferred_menu: String,
    /// Default list-rendering mode.
    pub default_view: DefaultView,
}

impl Default for UserPreferences {
    fn default() -> Self {
        let mut custom_shortcuts = std::collections::HashMap::new();
        custom_shortcuts.insert("search".to_string(), "ctrl+f".to_string());
        custom_shortcuts.insert("history".to_string(), "ctrl+h".to_string());
        custom_shortcuts.insert("favorites".to_string(), "ctrl+b".to_string());

        Self {
            favorite_items: Vec::new(),
            recently_used: VecDeque::new(),
            search_history: VecDeque::new(),
            custom_shortcuts,
            preferred_menu: "main_menu".to_string(),
            default_view: DefaultView::Table,
        }
    }
}

impl UserPreferences {
    /// Preferences never fail validation on their own; bounds are enforced
    /// on write via [`UserPreferences::enforce_caps`].
    pub fn validate(&self) -> Result<(), Vec<String>> {
        Ok(())
    }

    /// Drops oldest entries from `search_history`/`recently_used` until each
    /// is within `cap`.
    pub fn enforce_caps(&mut self, cap: usize) {
        while self.search_history.len() > cap {
            self.search_history.pop_front();
        }
        while self.recently_used.len() > cap {
            self.recently_used.pop_back();
        }
    }

    /// Adds `item_id` to favorites if not already present.
    pub fn add_favorite(&mut self, item_id: impl Into<String>) {
        let item_id = item_id.into();
        if !self.favorite_items.contains(&item_id) {
            self.favorite_items.push(item_id);
        }
    }

    /// Removes `item_id` from favorites, if present.
    pub fn remove_favorite(&mut self, item_id: &str) {
        self.favorite_items.retain(|existing| existing != item_id);
    }

    /// Appends `keyword` to search history, deduplicating and capping at
    /// `cap`.
    pub fn add_search_history(&mut self, keyword: impl Into<String>, cap: usize) {
        let keyword = keyword.into();
        if keyword.is_empty() || self.search_history.contains(&keyword) {
            return;
        }
        self.search_history.push_back(keyword);
        self.enforce_caps(cap);
    }

    /// Moves `item_id` to the front of recently-used, capping at `cap`.
    pub fn add_recently_used(&mut self, item_id: impl Into<String>, cap: usize) {
        let item_id = item_id.into();
        self.recently_used.retain(|existing| existing != &item_id);
        self.recently_used.push_front(item_id);
        self.enforce_caps(cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_app_config_validates() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_timeout() {
        let mut config = AppConfig::default();
        config.command_timeout = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_region_qualified_language() {
        let mut config = AppConfig::default();
        config.language = "en_US".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_malformed_language() {
        let mut config = AppConfig::default();
        config.language = "english".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn search_history_caps_drop_oldest() {
        let mut prefs = UserPreferences::default();
        for i in 0..5 {
            prefs.add_search_history(format!("term{i}"), 3);
        }
        assert_eq!(prefs.search_history.len(), 3);
        assert_eq!(prefs.search_history.front().unwrap(), "term2");
    }

    #[test]
    fn recently_used_moves_existing_to_front() {
        let mut prefs = UserPreferences::default();
        prefs.add_recently_used("a", 10);
        prefs.add_recently_used("b", 10);
        prefs.add_recently_used("a", 10);
        assert_eq!(prefs.recently_used.front().unwrap(), "a");
        assert_eq!(prefs.recently_used.len(), 2);
    }
}
