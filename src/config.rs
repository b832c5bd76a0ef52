//! Demo settings loaded from an optional TOML file.

use cliniko_client::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the settings file.
pub const CONFIG_PATH_ENV: &str = "CLINIKO_CONFIG";

/// Settings file read from the working directory when `CLINIKO_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "cliniko.toml";

/// Configuration error types.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse TOML configuration.
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// Invalid configuration value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
    /// The resolved client configuration was rejected.
    #[error("client configuration: {0}")]
    Client(#[from] cliniko_client::Error),
}

/// Root settings structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// API connection settings.
    pub api: ApiSettings,
    /// Demo output settings.
    pub demo: DemoSettings,
}

/// API connection settings. Unset values fall back to the environment.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Cliniko API key.
    pub api_key: Option<String>,
    /// Shard base URL, e.g. `https://api.au1.cliniko.com/v1`.
    pub base_url: Option<String>,
    /// Contact email sent in the user agent.
    pub email: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Demo output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoSettings {
    /// Rows printed for list previews.
    pub page_size_preview: usize,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            page_size_preview: 5,
        }
    }
}

impl Settings {
    /// Loads settings from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the settings file.
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads settings from `CLINIKO_CONFIG`, else from `cliniko.toml` if it
    /// exists, else returns defaults.
    ///
    /// # Errors
    /// Returns error if a settings file exists but cannot be read or parsed.
    pub fn discover() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parses settings from a TOML string.
    ///
    /// # Arguments
    /// * `content` - TOML content as string.
    ///
    /// # Errors
    /// Returns error if content cannot be parsed.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "api.timeout_secs must be positive".to_string(),
            ));
        }
        if self.demo.page_size_preview == 0 {
            return Err(ConfigError::InvalidValue(
                "demo.page_size_preview must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the client configuration. File values win; the environment
    /// fills whatever the file leaves out.
    ///
    /// # Errors
    /// Returns error if the API key or base URL is available from neither source.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let config = ClientConfig::resolve(
            self.api.api_key.clone(),
            self.api.base_url.clone(),
            self.api.email.clone(),
        )?;
        let timeout = self.api.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        Ok(config.with_timeout(Duration::from_secs(timeout)))
    }
}
