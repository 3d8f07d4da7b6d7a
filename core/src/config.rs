use crate::errors::{MediError, MediResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Model used when nothing else is configured
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash-preview-09-2025";
/// Base URL of the Generative Language API
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;

/// Key baked in at build time. Weak by nature; a key entered at run time
/// always takes precedence.
pub const BUILD_FALLBACK_API_KEY: Option<&str> = option_env!("MEDIAI_FALLBACK_API_KEY");

/// Configuration struct for the MediAI client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct MediConfig {
    pub fallback_api_key: Option<String>,
    pub model_name: Option<String>,
    pub api_base_url: Option<String>,
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl MediConfig {
    /// Built-in defaults, with the fallback key taken from the build
    /// environment or `GEMINI_API_KEY`
    pub fn with_defaults() -> Self {
        let fallback_api_key = BUILD_FALLBACK_API_KEY
            .map(str::to_string)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            fallback_api_key,
            model_name: Some(DEFAULT_MODEL_NAME.to_string()),
            api_base_url: Some(DEFAULT_API_BASE_URL.to_string()),
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            base_delay_ms: Some(DEFAULT_BASE_DELAY_MS),
            log_level: Some("warn".to_string()),
        }
    }

    /// Loads configuration from a file if it exists, otherwise returns an empty config
    pub fn load_from_file(path: &Path) -> MediResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            MediError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves configuration to a file
    pub fn save_to_file(&self, path: &Path) -> MediResult<()> {
        let content = toml::to_string(self)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                MediError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Writes the built-in defaults to `path` unless a file is already there.
    /// The fallback key is never written. Returns whether a file was created.
    pub fn write_default_if_missing(path: &Path) -> MediResult<bool> {
        if path.exists() {
            return Ok(false);
        }

        let defaults = Self {
            fallback_api_key: None,
            ..Self::with_defaults()
        };
        defaults.save_to_file(path)?;
        Ok(true)
    }

    /// Merges this config with another config, preferring values from the other config if present
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            fallback_api_key: other
                .fallback_api_key
                .clone()
                .or_else(|| self.fallback_api_key.clone()),
            model_name: other.model_name.clone().or_else(|| self.model_name.clone()),
            api_base_url: other
                .api_base_url
                .clone()
                .or_else(|| self.api_base_url.clone()),
            max_attempts: other.max_attempts.or(self.max_attempts),
            base_delay_ms: other.base_delay_ms.or(self.base_delay_ms),
            log_level: other.log_level.clone().or_else(|| self.log_level.clone()),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model_name.as_deref().unwrap_or(DEFAULT_MODEL_NAME)
    }

    pub fn api_base_url(&self) -> &str {
        self.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.unwrap_or(DEFAULT_BASE_DELAY_MS))
    }

    /// Fallback key, empty when neither the build nor the environment supplied one
    pub fn fallback_api_key(&self) -> &str {
        self.fallback_api_key.as_deref().unwrap_or_default()
    }
}

/// Helper function to get default config directory
pub fn get_default_config_dir(app_name: &str) -> MediResult<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        MediError::ConfigError("Could not determine home directory".to_string())
    })?;

    Ok(home_dir.join(".config").join(app_name))
}

/// Helper function to get default config file path
pub fn get_default_config_file(app_name: &str) -> MediResult<PathBuf> {
    let config_dir = get_default_config_dir(app_name)?;
    Ok(config_dir.join("config.toml"))
}
