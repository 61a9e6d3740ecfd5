use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};
use tracing::debug;

use crate::core::cache::DEFAULT_TTL;
use crate::providers::exchange_rate_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

pub const API_KEY_ENV: &str = "FXCONV_API_KEY";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            api_key: None,
            provider: ProviderConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxconv", "fxconv")
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

    /// Resolves the API key, preferring the environment over the file.
    pub fn api_key(&self) -> Result<String> {
        self.api_key_from(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_from(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .or_else(|| self.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .with_context(|| {
                format!("No API key configured. Set {API_KEY_ENV} or run `fxconv setup` and edit the config file")
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.provider.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
api_key: "abc123"
provider:
  base_url: "http://example.com/v6"
  timeout_secs: 3
cache_ttl_secs: 60
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.api_key.as_deref(), Some("abc123"));
        assert_eq!(config.provider.base_url, "http://example.com/v6");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = serde_yaml::from_str("api_key: xyz\n").unwrap();
        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.cache_ttl(), DEFAULT_TTL);

        let partial: AppConfig =
            serde_yaml::from_str("provider:\n  base_url: http://localhost\n").unwrap();
        assert!(partial.api_key.is_none());
        assert_eq!(partial.provider.timeout_secs, 10);
    }

    #[test]
    fn test_api_key_resolution() {
        let config = AppConfig {
            api_key: Some("from-file".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(config.api_key_from(None).unwrap(), "from-file");
        assert_eq!(
            config.api_key_from(Some("from-env".to_string())).unwrap(),
            "from-env"
        );

        let empty = AppConfig {
            api_key: Some("  ".to_string()),
            ..AppConfig::default()
        };
        let err = empty.api_key_from(None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
