/*!
Configuration management for the display panel application.
*/

use anyhow::{Context, Result};
use dwin_protocol::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub serial: SerialConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub panel: PanelConfig,
}

impl AppConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            serial: SerialConfig::default(),
            session: SessionConfig::default(),
            panel: PanelConfig::default(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse config file as TOML")?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize config to TOML")?;

        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Serial port settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the display's UART
    pub port: String,

    /// Line speed; the T5UIC1 firmware runs at 115200 8N1
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyAMA0".to_string(),
            baud_rate: 115_200,
        }
    }
}

/// What the panel shows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Backlight level applied after connecting
    pub backlight: i32,

    /// Clock redraw interval in milliseconds
    pub clock_interval_ms: u64,

    /// Progress bar animation step in milliseconds
    pub progress_interval_ms: u64,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            backlight: 0xFF,
            clock_interval_ms: 1000,
            progress_interval_ms: 250,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_roundtrip() {
        let original_config = AppConfig::new();

        let temp_file = NamedTempFile::new().unwrap();
        let temp_path = temp_file.path();

        // Save and load
        original_config.save_to_file(temp_path).unwrap();
        let loaded_config = AppConfig::load_from_file(temp_path).unwrap();

        // Compare (using debug format since we don't have PartialEq)
        assert_eq!(format!("{:?}", original_config), format!("{:?}", loaded_config));
    }

    #[test]
    fn test_default_values() {
        let config = AppConfig::new();

        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.session.handshake_attempts, 5);
        assert_eq!(config.panel.backlight, 0xFF);
        assert_eq!(config.panel.clock_interval_ms, 1000);
    }

    #[test]
    fn test_sections_are_optional() {
        let config: AppConfig = toml::from_str("[serial]\nport = \"/dev/ttyUSB0\"\n").unwrap();
        assert_eq!(config.serial.port, "/dev/ttyUSB0");
        assert_eq!(config.serial.baud_rate, 115_200);
        assert!(config.session.frame_header);
    }
}
