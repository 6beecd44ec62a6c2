//! Settings validation utilities

use crate::{
    ApiConfig, ChartSettings, ConfigError, InteractionConfig, LayoutConfig, MarkerConfig, Result,
    SyncConfig,
};

/// Settings validator with range and cross-field checks
pub struct SettingsValidator;

impl SettingsValidator {
    /// Validate complete settings
    pub fn validate(settings: &ChartSettings) -> Result<()> {
        Self::validate_interaction(&settings.interaction)?;
        Self::validate_markers(&settings.markers)?;
        Self::validate_sync(&settings.sync)?;
        Self::validate_layout(&settings.layout)?;
        Self::validate_api(&settings.api)?;
        Ok(())
    }

    fn validate_interaction(interaction: &InteractionConfig) -> Result<()> {
        if !interaction.click_threshold_px.is_finite() || interaction.click_threshold_px <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "Invalid click_threshold_px: {}. Must be positive",
                interaction.click_threshold_px
            )));
        }

        if !interaction.drag_threshold_px.is_finite() {
            return Err(ConfigError::Validation(format!(
                "Invalid drag_threshold_px: {}. Must be finite",
                interaction.drag_threshold_px
            )));
        }

        // A gesture cannot be both a click and a zoom
        if interaction.drag_threshold_px < interaction.click_threshold_px {
            return Err(ConfigError::Validation(format!(
                "drag_threshold_px ({}) must not be below click_threshold_px ({})",
                interaction.drag_threshold_px, interaction.click_threshold_px
            )));
        }

        Ok(())
    }

    fn validate_markers(markers: &MarkerConfig) -> Result<()> {
        for (name, radius) in [
            ("point_radius", markers.point_radius),
            ("change_point_radius", markers.change_point_radius),
        ] {
            if !radius.is_finite() || radius <= 0.0 || radius > 50.0 {
                return Err(ConfigError::Validation(format!(
                    "Invalid {name}: {radius}. Must be between 0.1 and 50.0"
                )));
            }
        }

        if !markers.selected_border_width.is_finite() || markers.selected_border_width < 0.0 {
            return Err(ConfigError::Validation(format!(
                "Invalid selected_border_width: {}",
                markers.selected_border_width
            )));
        }

        let mut channels = markers.point_color.iter().chain(markers.change_point_color.iter());
        if channels.any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Validation(
                "Marker color channels must be between 0.0 and 1.0".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_sync(sync: &SyncConfig) -> Result<()> {
        if !(0.0..=1.0).contains(&sync.ghost_opacity) {
            return Err(ConfigError::Validation(format!(
                "Invalid ghost_opacity: {}. Must be between 0.0 and 1.0",
                sync.ghost_opacity
            )));
        }
        Ok(())
    }

    fn validate_layout(layout: &LayoutConfig) -> Result<()> {
        if !(1..=4).contains(&layout.charts_per_row) {
            return Err(ConfigError::Validation(format!(
                "Invalid charts_per_row: {}. Must be between 1 and 4",
                layout.charts_per_row
            )));
        }
        Ok(())
    }

    fn validate_api(api: &ApiConfig) -> Result<()> {
        if api.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("api.base_url cannot be empty".to_string()));
        }
        Ok(())
    }
}
