//! Application configuration module
//!
//! Persisted settings for path capture, the world store and the interaction
//! session, plus the save directory.

mod manager;

pub use manager::ConfigManager;

use std::path::PathBuf;

use rugo_core::{CaptureSettings, SessionSettings, StoreSettings};
use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Configuration format version
    #[serde(default)]
    pub version: u32,
    /// Path capture settings
    #[serde(default)]
    pub capture: CaptureSettings,
    /// World store settings
    #[serde(default)]
    pub store: StoreSettings,
    /// Interaction session settings
    #[serde(default)]
    pub session: SessionSettings,
    /// Root of the saved worlds
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,
}

impl AppConfig {
    /// Current configuration version
    pub const CURRENT_VERSION: u32 = 1;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            ..Default::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 0,
            capture: CaptureSettings::default(),
            store: StoreSettings::default(),
            session: SessionSettings::default(),
            save_dir: default_save_dir(),
        }
    }
}

fn default_save_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rugo")
        .join("SavedGames")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rugo_core::world::MissingTemplatePolicy;

    #[test]
    fn test_new_has_current_version() {
        assert_eq!(AppConfig::new().version, AppConfig::CURRENT_VERSION);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let text = r#"(
            version: 1,
            capture: (spacing: 0.05),
            store: (missing_template: Abort),
        )"#;
        let config: AppConfig = ron::from_str(text).unwrap();

        assert_eq!(config.capture.spacing, 0.05);
        assert_eq!(config.capture.height_tolerance, 0.001);
        assert_eq!(config.store.missing_template, MissingTemplatePolicy::Abort);
        assert_eq!(config.session, SessionSettings::default());
        assert_eq!(config.save_dir, default_save_dir());
    }

    #[test]
    fn test_config_round_trip() {
        let mut config = AppConfig::new();
        config.session.path_template = "Ball".to_string();
        config.save_dir = PathBuf::from("/tmp/rugo-saves");

        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let parsed: AppConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
