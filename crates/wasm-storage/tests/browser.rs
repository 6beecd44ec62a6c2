#![cfg(target_arch = "wasm32")]

use config_system::{KeyValueStore, SettingsStore, TOKEN_KEY};
use wasm_bindgen_test::*;
use wasm_storage::BrowserStorage;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_round_trips_strings() {
    let storage = BrowserStorage::session();
    storage.clear().unwrap();

    storage.set("perfcharts.test", "value").unwrap();
    assert_eq!(storage.get("perfcharts.test").unwrap().as_deref(), Some("value"));
    assert_eq!(storage.keys().unwrap(), vec!["perfcharts.test".to_string()]);

    storage.remove("perfcharts.test").unwrap();
    assert!(!storage.has("perfcharts.test").unwrap());
}

#[wasm_bindgen_test]
fn test_json_helpers() {
    let storage = BrowserStorage::session();
    storage.set_json("perfcharts.list", &vec![1, 2, 3]).unwrap();
    assert_eq!(
        storage.get_json::<Vec<i32>>("perfcharts.list").unwrap(),
        Some(vec![1, 2, 3])
    );

    storage.set("perfcharts.list", "{not json").unwrap();
    assert!(storage.get_json::<Vec<i32>>("perfcharts.list").is_err());
}

#[wasm_bindgen_test]
fn test_settings_store_reads_token() {
    let storage = BrowserStorage::session();
    storage.clear().unwrap();
    storage.set(TOKEN_KEY, "secret").unwrap();

    let settings = SettingsStore::load(storage);
    assert_eq!(settings.token().as_deref(), Some("secret"));
    assert_eq!(settings.settings().sync.ghost_opacity, 0.6);
}
