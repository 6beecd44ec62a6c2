//! Configuration system for perfcharts
//! Chart interaction thresholds, marker styling, sync behavior, layout
//! preferences and the API endpoint, plus the storage seam they persist through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod parser;
pub mod storage;
pub mod validation;

pub use parser::{ConfigFormat, ConfigParser};
pub use storage::{KeyValueStore, MemoryStore, SettingsStore, SETTINGS_KEY, TOKEN_KEY};
pub use validation::SettingsValidator;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Complete settings for a dashboard page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub interaction: InteractionConfig,
    pub markers: MarkerConfig,
    pub sync: SyncConfig,
    pub layout: LayoutConfig,
    pub api: ApiConfig,
}

/// Pointer gesture thresholds, in CSS pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Mouse-down/mouse-up movement below this is a click
    pub click_threshold_px: f64,
    /// Drag selections narrower than this do not zoom
    pub drag_threshold_px: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            click_threshold_px: 2.0,
            drag_threshold_px: 10.0,
        }
    }
}

/// Point marker styling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub point_radius: f32,
    pub change_point_radius: f32,
    pub selected_border_width: f32,
    pub point_color: [f32; 4],
    pub change_point_color: [f32; 4],
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            point_radius: 3.0,
            change_point_radius: 6.0,
            selected_border_width: 3.0,
            point_color: [0.25, 0.41, 0.88, 1.0],
            change_point_color: [0.86, 0.08, 0.24, 1.0],
        }
    }
}

/// Cross-chart synchronization behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub ghost_opacity: f32,
    pub sync_hover: bool,
    pub sync_zoom: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            ghost_opacity: 0.6,
            sync_hover: true,
            sync_zoom: true,
        }
    }
}

/// Page layout preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub charts_per_row: u8,
    pub show_legend: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            charts_per_row: 1,
            show_legend: true,
        }
    }
}

/// Results API endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nyrkio.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: ChartSettings =
            serde_json::from_str(r#"{"layout": {"charts_per_row": 2}}"#).unwrap();

        assert_eq!(settings.layout.charts_per_row, 2);
        assert!(settings.layout.show_legend);
        assert_eq!(settings.interaction, InteractionConfig::default());
        assert_eq!(settings.sync.ghost_opacity, 0.6);
    }
}
