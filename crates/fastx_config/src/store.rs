//! SQLite-backed config store.

use std::path::Path;

use hashbrown::HashMap;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::ConfigError;
use crate::schema::{AppConfig, UserPreferences};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS configs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        key TEXT UNIQUE NOT NULL,
        value TEXT NOT NULL,
        type TEXT NOT NULL,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP,
        updated_at TEXT DEFAULT CURRENT_TIMESTAMP
    )
";

struct State {
    conn: Connection,
    config: AppConfig,
    preferences: UserPreferences,
    plugin_configs: HashMap<String, Value>,
    /// Keys under type `app` not recognized by [`AppConfig`]. Kept so a
    /// future version that knows the key can read it back; never merged
    /// into the typed view.
    extra_app: HashMap<String, Value>,
    /// Same as `extra_app`, for type `preference`.
    extra_pref: HashMap<String, Value>,
    degraded: bool,
}

/// Durable, typed configuration for the application, user preferences, and
/// per-plugin settings. Mirrors
/// `original_source/core/config_manager.py::ConfigManager`.
pub struct ConfigStore {
    state: Mutex<State>,
}

impl ConfigStore {
    /// Opens (creating if absent) the SQLite database at `path` and loads
    /// its contents, falling back to defaults for any namespace that fails
    /// validation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute(CREATE_TABLE, [])?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_configs_key ON configs(key)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_configs_type ON configs(type)",
            [],
        )?;

        let mut state = State {
            conn,
            config: AppConfig::default(),
            preferences: UserPreferences::default(),
            plugin_configs: HashMap::new(),
            extra_app: HashMap::new(),
            extra_pref: HashMap::new(),
            degraded: false,
        };
        load_config(&mut state)?;
        Ok(Self {
            state: Mutex::new(state),
        })
    }

    /// Opens an in-memory store, primarily for tests.
    pub fn open_in_memory() -> Result<Self, ConfigError> {
        Self::open(":memory:")
    }

    /// Whether the store reverted any namespace to defaults on load or
    /// since the last successful write.
    pub fn is_degraded(&self) -> bool {
        self.state.lock().degraded
    }

    /// Returns a snapshot of the app config.
    pub fn app(&self) -> AppConfig {
        self.state.lock().config.clone()
    }

    /// Returns a snapshot of the user preferences.
    pub fn preferences(&self) -> UserPreferences {
        self.state.lock().preferences.clone()
    }

    /// Reads a single app config field by name, or `None` if unknown.
    pub fn get_app(&self, key: &str) -> Option<Value> {
        let state = self.state.lock();
        to_map(&state.config).remove(key)
    }

    /// Sets a single app config field, validating the resulting whole
    /// config before persisting. On failure, the store is left unchanged.
    ///
    /// A key not recognized by [`AppConfig`] is stored under type `app` for
    /// forward compatibility but never surfaces through [`Self::app`] or
    /// [`Self::get_app`].
    pub fn set_app(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        let mut map = to_map(&state.config);
        if !map.contains_key(key) {
            state.extra_app.insert(key.to_string(), value);
            save_config(&mut state)?;
            state.degraded = false;
            return Ok(());
        }
        map.insert(key.to_string(), value);

        let candidate: AppConfig =
            serde_json::from_value(Value::Object(map)).map_err(|err| ConfigError::ConfigInvalid {
                key: key.to_string(),
                reasons: vec![err.to_string()],
            })?;
        candidate.validate().map_err(|reasons| ConfigError::ConfigInvalid {
            key: key.to_string(),
            reasons,
        })?;

        state.config = candidate;
        save_config(&mut state)?;
        state.degraded = false;
        Ok(())
    }

    /// Reads a single preference field by name, or `None` if unknown.
    pub fn get_pref(&self, key: &str) -> Option<Value> {
        let state = self.state.lock();
        to_map(&state.preferences).remove(key)
    }

    /// Sets a single preference field, validating and persisting the whole
    /// preferences object.
    ///
    /// A key not recognized by [`UserPreferences`] is stored under type
    /// `preference` for forward compatibility but never surfaces through
    /// [`Self::preferences`] or [`Self::get_pref`].
    pub fn set_pref(&self, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        let mut map = to_map(&state.preferences);
        if !map.contains_key(key) {
            state.extra_pref.insert(key.to_string(), value);
            save_config(&mut state)?;
            state.degraded = false;
            return Ok(());
        }
        map.insert(key.to_string(), value);

        let mut candidate: UserPreferences =
            serde_json::from_value(Value::Object(map)).map_err(|err| ConfigError::ConfigInvalid {
                key: key.to_string(),
                reasons: vec![err.to_string()],
            })?;
        candidate
            .validate()
            .map_err(|reasons| ConfigError::ConfigInvalid {
                key: key.to_string(),
                reasons,
            })?;
        candidate.enforce_caps(state.config.max_history_items as usize);

        state.preferences = candidate;
        save_config(&mut state)?;
        state.degraded = false;
        Ok(())
    }

    /// Gets a plugin's private config object, or an empty object if none
    /// was ever set.
    pub fn get_plugin(&self, name: &str) -> Value {
        self.state
            .lock()
            .plugin_configs
            .get(name)
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Replaces a plugin's entire private config object.
    pub fn set_plugin(&self, name: &str, config: Value) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.plugin_configs.insert(name.to_string(), config);
        save_config(&mut state)?;
        state.degraded = false;
        Ok(())
    }

    /// Sets one key within a plugin's config object, creating the object if
    /// needed.
    pub fn update_plugin(&self, name: &str, key: &str, value: Value) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        let entry = state
            .plugin_configs
            .entry(name.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(map) = entry {
            map.insert(key.to_string(), value);
        } else {
            *entry = Value::Object(Map::from_iter([(key.to_string(), value)]));
        }
        save_config(&mut state)?;
        state.degraded = false;
        Ok(())
    }

    /// Removes a plugin's private config entirely.
    pub fn remove_plugin(&self, name: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.plugin_configs.remove(name);
        state
            .conn
            .execute(
                "DELETE FROM configs WHERE key = ?1 AND type = 'plugin'",
                params![name],
            )
            .map_err(ConfigError::from)?;
        Ok(())
    }

    /// Lists every plugin's private config by name.
    pub fn list_plugin_configs(&self) -> HashMap<String, Value> {
        self.state.lock().plugin_configs.clone()
    }

    /// Atomically wipes and re-populates the store with schema defaults.
    pub fn reset_to_defaults(&self) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.config = AppConfig::default();
        state.preferences = UserPreferences::default();
        state.plugin_configs.clear();
        state.extra_app.clear();
        state.extra_pref.clear();
        state.conn.execute("DELETE FROM configs", [])?;
        save_config(&mut state)?;
        state.degraded = false;
        Ok(())
    }

    /// Convenience wrapper over [`UserPreferences::add_favorite`] that
    /// persists the change.
    pub fn add_favorite(&self, item_id: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.preferences.add_favorite(item_id);
        save_config(&mut state)
    }

    /// Convenience wrapper over [`UserPreferences::remove_favorite`] that
    /// persists the change.
    pub fn remove_favorite(&self, item_id: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.preferences.remove_favorite(item_id);
        save_config(&mut state)
    }

    /// Convenience wrapper over [`UserPreferences::add_search_history`] that
    /// persists the change and applies the configured cap.
    pub fn add_search_history(&self, keyword: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        let cap = state.config.max_history_items as usize;
        state.preferences.add_search_history(keyword, cap);
        save_config(&mut state)
    }

    /// Clears the search history.
    pub fn clear_search_history(&self) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        state.preferences.search_history.clear();
        save_config(&mut state)
    }

    /// Convenience wrapper over [`UserPreferences::add_recently_used`] that
    /// persists the change and applies the configured cap.
    pub fn add_recently_used(&self, item_id: &str) -> Result<(), ConfigError> {
        let mut state = self.state.lock();
        let cap = state.config.max_history_items as usize;
        state.preferences.add_recently_used(item_id, cap);
        save_config(&mut state)
    }
}

fn to_map<T: serde::Serialize>(value: &T) -> Map<String, Value> {
    match serde_json::to_value(value).expect("schema structs always serialize") {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn load_config(state: &mut State) -> Result<(), ConfigError> {
    let app_rows = load_rows(&state.conn, "app")?;
    let pref_rows = load_rows(&state.conn, "preference")?;
    let plugin_rows = load_rows(&state.conn, "plugin")?;
    state.plugin_configs = plugin_rows.into_iter().collect();

    let app_defaults = to_map(&state.config);
    let (app_known, app_extra): (HashMap<String, Value>, HashMap<String, Value>) =
        app_rows.into_iter().partition(|(key, _)| app_defaults.contains_key(key));
    state.extra_app = app_extra;

    if !app_known.is_empty() {
        let mut map = app_defaults;
        for (key, value) in app_known {
            map.insert(key, value);
        }
        match serde_json::from_value::<AppConfig>(Value::Object(map))
            .ok()
            .filter(|candidate| candidate.validate().is_ok())
        {
            Some(candidate) => state.config = candidate,
            None => {
                warn!("app config failed validation on load; reverting to defaults");
                state.config = AppConfig::default();
                state.degraded = true;
            }
        }
    }

    let pref_defaults = to_map(&state.preferences);
    let (pref_known, pref_extra): (HashMap<String, Value>, HashMap<String, Value>) =
        pref_rows.into_iter().partition(|(key, _)| pref_defaults.contains_key(key));
    state.extra_pref = pref_extra;

    if !pref_known.is_empty() {
        let mut map = pref_defaults;
        for (key, value) in pref_known {
            map.insert(key, value);
        }
        match serde_json::from_value::<UserPreferences>(Value::Object(map)).ok() {
            Some(candidate) => state.preferences = candidate,
            None => {
                warn!("user preferences failed validation on load; reverting to defaults");
                state.preferences = UserPreferences::default();
                state.degraded = true;
            }
        }
    }

    Ok(())
}

fn load_rows(conn: &Connection, kind: &str) -> Result<HashMap<String, Value>, ConfigError> {
    let mut stmt = conn.prepare("SELECT key, value FROM configs WHERE type = ?1")?;
    let rows = stmt
        .query_map(params![kind], |row| {
            let key: String = row.get(0)?;
            let raw: String = row.get(1)?;
            Ok((key, raw))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut out = HashMap::new();
    for (key, raw) in rows {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                out.insert(key, value);
            }
            Err(err) => warn!(key = %key, %err, "skipping unparsable config row"),
        }
    }
    Ok(out)
}

fn save_config(state: &mut State) -> Result<(), ConfigError> {
    let tx = state.conn.transaction()?;
    {
        let mut upsert = |key: &str, value: &Value, kind: &str| -> rusqlite::Result<()> {
            tx.execute(
                "INSERT INTO configs (key, value, type, updated_at) VALUES (?1, ?2, ?3, CURRENT_TIMESTAMP)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, type = excluded.type, updated_at = CURRENT_TIMESTAMP",
                params![key, value.to_string(), kind],
            )?;
            Ok(())
        };

        for (key, value) in to_map(&state.config) {
            upsert(&key, &value, "app")?;
        }
        for (key, value) in &state.extra_app {
            upsert(key, value, "app")?;
        }
        for (key, value) in to_map(&state.preferences) {
            upsert(&key, &value, "preference")?;
        }
        for (key, value) in &state.extra_pref {
            upsert(key, value, "preference")?;
        }
        for (name, value) in &state.plugin_configs {
            upsert(name, value, "plugin")?;
        }
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_store() {
        let store = ConfigStore::open_in_memory().unwrap();
        assert_eq!(store.app(), AppConfig::default());
        assert!(!store.is_degraded());
    }

    #[test]
    fn set_app_persists_and_validates() {
        let store = ConfigStore::open_in_memory().unwrap();
        store.set_app("command_timeout", Value::from(120)).unwrap();
        assert_eq!(store.get_app("command_timeout"), Some(Value::from(120)));
    }

    #[test]
    fn set_app_rejects_invalid_value_without_mutating() {
        let store = ConfigStore::open_in_memory().unwrap();
        let err = store.set_app("command_timeout", Value::from(10_000));
        assert!(err.is_err());
        assert_eq!(store.app().command_timeout, 30);
    }

    #[test]
    fn plugin_config_roundtrips() {
        let store = ConfigStore::open_in_memory().unwrap();
        store
            .set_plugin("demo", serde_json::json!({"enabled": true}))
            .unwrap();
        assert_eq!(
            store.get_plugin("demo"),
            serde_json::json!({"enabled": true})
        );
        store.remove_plugin("demo").unwrap();
        assert_eq!(store.get_plugin("demo"), serde_json::json!({}));
    }

    #[test]
    fn reset_to_defaults_clears_everything() {
        let store = ConfigStore::open_in_memory().unwrap();
        store.set_app("theme", Value::from("midnight")).unwrap();
        store.set_plugin("demo", serde_json::json!({"x": 1})).unwrap();
        store.reset_to_defaults().unwrap();
        assert_eq!(store.app().theme, "default");
        assert!(store.list_plugin_configs().is_empty());
    }

    #[test]
    fn search_history_cap_is_enforced_through_store() {
        let store = ConfigStore::open_in_memory().unwrap();
        store
            .set_app("max_history_items", Value::from(10))
            .unwrap();
        for i in 0..15 {
            store.add_search_history(&format!("q{i}")).unwrap();
        }
        assert_eq!(store.preferences().search_history.len(), 10);
    }

    #[test]
    fn set_app_accepts_unknown_key_without_exposing_it() {
        let store = ConfigStore::open_in_memory().unwrap();
        store.set_app("future_field", Value::from("x")).unwrap();
        assert_eq!(store.get_app("future_field"), None);
        assert_eq!(store.app(), AppConfig::default());
    }

    #[test]
    fn set_pref_accepts_unknown_key_without_exposing_it() {
        let store = ConfigStore::open_in_memory().unwrap();
        store.set_pref("future_field", Value::from(1)).unwrap();
        assert_eq!(store.get_pref("future_field"), None);
        assert_eq!(store.preferences(), UserPreferences::default());
    }

    #[test]
    fn key_is_unique_across_types() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("config.sqlite3");

        let store = ConfigStore::open(&db_path).unwrap();
        store.set_plugin("theme", serde_json::json!({"x": 1})).unwrap();
        store.set_app("theme", Value::from("midnight")).unwrap();
        drop(store);

        // A plugin config and an app field sharing the key `theme` collapse
        // to one row; the later write (the app field) wins.
        let reopened = ConfigStore::open(&db_path).unwrap();
        assert_eq!(reopened.app().theme, "midnight");
        assert_eq!(reopened.get_plugin("theme"), serde_json::json!({}));
    }
}
