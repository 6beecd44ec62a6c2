//! Storage seam for persisted preferences
//!
//! Settings and the auth token live behind [`KeyValueStore`], so the chart
//! core never touches browser storage directly. `MemoryStore` backs tests and
//! native use; the browser implementation lives in the wasm-storage crate.

use crate::{ChartSettings, ConfigError, Result, SettingsValidator};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Key under which settings are persisted as JSON
pub const SETTINGS_KEY: &str = "perfcharts.settings";

/// Key under which the bearer token is kept
pub const TOKEN_KEY: &str = "auth.token";

/// Minimal string key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// Page-level settings backed by a [`KeyValueStore`]
pub struct SettingsStore<S: KeyValueStore> {
    store: S,
    current: ChartSettings,
}

impl<S: KeyValueStore> SettingsStore<S> {
    /// Load persisted settings, falling back to defaults when absent or invalid
    pub fn load(store: S) -> Self {
        let current = match Self::read(&store) {
            Ok(Some(settings)) => settings,
            Ok(None) => ChartSettings::default(),
            Err(e) => {
                log::warn!("[SettingsStore] Ignoring persisted settings: {e}");
                ChartSettings::default()
            }
        };

        Self { store, current }
    }

    fn read(store: &S) -> Result<Option<ChartSettings>> {
        let Some(json) = store.get(SETTINGS_KEY)? else {
            return Ok(None);
        };
        let settings: ChartSettings = serde_json::from_str(&json)
            .map_err(|e| ConfigError::Parse(format!("JSON parse error: {e}")))?;
        SettingsValidator::validate(&settings)?;
        Ok(Some(settings))
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.current
    }

    /// Validate and persist `settings`
    pub fn save(&mut self, settings: ChartSettings) -> Result<()> {
        SettingsValidator::validate(&settings)?;
        let json = serde_json::to_string(&settings)
            .map_err(|e| ConfigError::Parse(format!("JSON serialize error: {e}")))?;
        self.store.set(SETTINGS_KEY, &json)?;
        self.current = settings;
        log::debug!("[SettingsStore] Settings saved");
        Ok(())
    }

    /// Apply `f` to a copy of the current settings and persist the result
    pub fn update<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut ChartSettings),
    {
        let mut next = self.current.clone();
        f(&mut next);
        self.save(next)
    }

    /// Drop persisted settings and return to defaults
    pub fn reset(&mut self) -> Result<()> {
        self.store.remove(SETTINGS_KEY)?;
        self.current = ChartSettings::default();
        Ok(())
    }

    /// Bearer token kept alongside the settings, if any
    pub fn token(&self) -> Option<String> {
        match self.store.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                log::warn!("[SettingsStore] Cannot read token: {e}");
                None
            }
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
