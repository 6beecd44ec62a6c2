//! Settings parser for multiple formats

use crate::{ChartSettings, ConfigError, Result, SettingsValidator};
use std::fs;
use std::path::Path;

/// Settings format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Settings parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse and validate settings from a file
    pub fn parse_file(path: impl AsRef<Path>) -> Result<ChartSettings> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = Self::detect_format(path)?;
        Self::parse_string(&content, format)
    }

    /// Parse and validate settings from a string
    pub fn parse_string(content: &str, format: ConfigFormat) -> Result<ChartSettings> {
        let settings = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("YAML parse error: {e}")))?,
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("JSON parse error: {e}")))?,
            ConfigFormat::Toml => toml::from_str(content)
                .map_err(|e| ConfigError::Parse(format!("TOML parse error: {e}")))?,
        };

        SettingsValidator::validate(&settings)?;
        Ok(settings)
    }

    /// Serialize settings in the given format
    pub fn to_string(settings: &ChartSettings, format: ConfigFormat) -> Result<String> {
        match format {
            ConfigFormat::Yaml => serde_yaml::to_string(settings)
                .map_err(|e| ConfigError::Parse(format!("YAML serialize error: {e}"))),
            ConfigFormat::Json => serde_json::to_string(settings)
                .map_err(|e| ConfigError::Parse(format!("JSON serialize error: {e}"))),
            ConfigFormat::Toml => toml::to_string(settings)
                .map_err(|e| ConfigError::Parse(format!("TOML serialize error: {e}"))),
        }
    }

    /// Detect settings format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ConfigError::Parse("Cannot determine config format from file extension".to_string())
        })?;

        match ext.to_lowercase().as_str() {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "json" => Ok(ConfigFormat::Json),
            "toml" => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::Parse(format!("Unsupported config format: {ext}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml() {
        let content = r#"
[interaction]
click_threshold_px = 3.0
drag_threshold_px = 12.0

[sync]
ghost_opacity = 0.5
"#;
        let settings = ConfigParser::parse_string(content, ConfigFormat::Toml).unwrap();

        assert_eq!(settings.interaction.click_threshold_px, 3.0);
        assert_eq!(settings.interaction.drag_threshold_px, 12.0);
        assert_eq!(settings.sync.ghost_opacity, 0.5);
        assert!(settings.sync.sync_hover);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let content = r#"{"sync": {"ghost_opacity": 1.5}}"#;
        let err = ConfigParser::parse_string(content, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_parse_file_by_extension() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "layout:\n  charts_per_row: 3").unwrap();

        let settings = ConfigParser::parse_file(file.path()).unwrap();
        assert_eq!(settings.layout.charts_per_row, 3);
    }

    #[test]
    fn test_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            ConfigParser::parse_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
