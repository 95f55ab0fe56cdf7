use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

fn default_base_url() -> String {
    "https://openexchangerates.org/api".to_string()
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub app_id: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    /// Symbol the converted list is denominated in by default.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// How long amount input must be quiet before a reload fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fxr", "fxr")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization_with_defaults() {
        let yaml_str = r#"
api:
  app_id: "abc123"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.app_id, "abc123");
        assert_eq!(config.api.base_url, "https://openexchangerates.org/api");
        assert_eq!(config.currency, "USD");
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn test_config_deserialization_with_overrides() {
        let yaml_str = r#"
api:
  base_url: "http://example.com/api"
  app_id: "abc123"
currency: "JPY"
debounce_ms: 50
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api.base_url, "http://example.com/api");
        assert_eq!(config.currency, "JPY");
        assert_eq!(config.debounce_ms, 50);
    }
}
