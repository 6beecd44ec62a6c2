//! Browser-backed settings storage
//!
//! [`BrowserStorage`] puts `localStorage` or `sessionStorage` behind the
//! [`KeyValueStore`] trait, so the settings store and the auth token lookup
//! work the same in the page as they do against a `MemoryStore` in tests.

use config_system::{ConfigError, KeyValueStore, Result};
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Area {
    Local,
    Session,
}

/// LocalStorage or SessionStorage of the current window
#[derive(Debug, Clone, Copy)]
pub struct BrowserStorage {
    area: Area,
}

impl BrowserStorage {
    pub fn local() -> Self {
        Self { area: Area::Local }
    }

    pub fn session() -> Self {
        Self {
            area: Area::Session,
        }
    }

    /// Store a value as JSON
    pub fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| ConfigError::Parse(format!("JSON error: {e}")))?;
        self.set(key, &json)
    }

    /// Read a JSON value; a missing key is `Ok(None)`
    pub fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| ConfigError::Parse(format!("JSON error in {key}: {e}"))),
            None => Ok(None),
        }
    }

    pub fn has(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let storage = self.storage()?;
        let len = storage.length().map_err(js_error)?;

        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = storage.key(i).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    pub fn clear(&self) -> Result<()> {
        self.storage()?.clear().map_err(js_error)
    }

    fn storage(&self) -> Result<web_sys::Storage> {
        let window =
            web_sys::window().ok_or_else(|| ConfigError::Storage("No window object".into()))?;

        let (storage, name) = match self.area {
            Area::Local => (window.local_storage(), "LocalStorage"),
            Area::Session => (window.session_storage(), "SessionStorage"),
        };
        storage
            .map_err(|_| ConfigError::Storage(format!("{name} not available")))?
            .ok_or_else(|| ConfigError::Storage(format!("{name} not supported")))
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage()?.get_item(key).map_err(js_error)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage()?.set_item(key, value).map_err(|e| {
            // Quota errors land here
            log::warn!("[BrowserStorage] Failed to write {key}");
            js_error(e)
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage()?.remove_item(key).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> ConfigError {
    ConfigError::Storage(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}
