//! Configuration management for the `maptool` application
//!
//! Handles loading configuration from files and environment variables,
//! validates all settings, and persists updates (the `update_api_key`
//! contract) back to disk.

use crate::MapToolError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for the `maptool` application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapToolConfig {
    /// Primary map provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Secondary provider configuration; parsed and persisted but never
    /// exercised by any operation
    #[serde(default)]
    pub secondary: SecondaryProviderConfig,
    /// Local distance fallback configuration
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Primary provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider API key; empty means unconfigured
    #[serde(default)]
    pub api_key: String,
    /// Base URL for provider requests
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Page size cap for place searches
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    /// Endpoint path per operation
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// Endpoint paths relative to the provider base URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_geocoding_path")]
    pub geocoding: String,
    #[serde(default = "default_reverse_geocoding_path")]
    pub reverse_geocoding: String,
    #[serde(default = "default_place_search_path")]
    pub place_search: String,
    #[serde(default = "default_route_matrix_path")]
    pub route_matrix: String,
    #[serde(default = "default_direction_path")]
    pub direction: String,
}

/// Reserved configuration for a second provider; kept for config-file
/// compatibility, no operation reads it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondaryProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_secondary_base_url")]
    pub base_url: String,
}

/// Which local formula backs the distance fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackFormula {
    /// Legacy `sqrt(dlat^2 + dlon^2) * 111` approximation
    #[default]
    Planar,
    /// Great-circle distance
    Haversine,
}

/// Distance fallback settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Formula used when the routing matrix is unavailable
    #[serde(default)]
    pub formula: FallbackFormula,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_base_url() -> String {
    "https://api.map.baidu.com".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_max_results() -> u32 {
    20
}

fn default_geocoding_path() -> String {
    "/geocoding/v3/".to_string()
}

fn default_reverse_geocoding_path() -> String {
    "/reverse_geocoding/v3/".to_string()
}

fn default_place_search_path() -> String {
    "/place/v2/search".to_string()
}

fn default_route_matrix_path() -> String {
    "/routematrix/v2/driving".to_string()
}

fn default_direction_path() -> String {
    "/direction/v2/driving".to_string()
}

fn default_secondary_base_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_results: default_max_results(),
            endpoints: Endpoints::default(),
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: default_geocoding_path(),
            reverse_geocoding: default_reverse_geocoding_path(),
            place_search: default_place_search_path(),
            route_matrix: default_route_matrix_path(),
            direction: default_direction_path(),
        }
    }
}

impl Default for SecondaryProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_secondary_base_url(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl MapToolConfig {
    /// Load configuration from the default file location and environment
    /// variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from a specific path, falling back to the default
    /// location
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment variable overrides, e.g. MAPTOOL_PROVIDER__API_KEY:
        // a single underscore after the prefix, double underscores between
        // nesting levels.
        builder = builder.add_source(
            Environment::with_prefix("MAPTOOL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: MapToolConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("maptool").join("config.toml"))
    }

    /// Whether the primary provider has a usable API key
    #[must_use]
    pub fn is_provider_configured(&self) -> bool {
        !self.provider.api_key.trim().is_empty()
    }

    /// Replace the primary provider's API key. In-flight requests keep the
    /// key they started with; the next request observes the new one.
    pub fn update_api_key(&mut self, api_key: &str) {
        self.provider.api_key = api_key.to_string();
    }

    /// Persist the configuration to disk as TOML
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let rendered =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize configuration")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_urls_and_paths()?;
        Ok(())
    }

    /// Validate the API key when one is present (an empty key is a valid,
    /// unconfigured state)
    fn validate_api_key(&self) -> Result<()> {
        let api_key = self.provider.api_key.trim();
        if api_key.is_empty() {
            return Ok(());
        }

        if api_key.len() < 8 {
            return Err(MapToolError::config(
                "Provider API key appears to be invalid (too short). Please check your API key.",
            )
            .into());
        }

        if api_key.len() > 100 {
            return Err(MapToolError::config(
                "Provider API key appears to be invalid (too long). Please check your API key.",
            )
            .into());
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.provider.timeout_seconds == 0 {
            return Err(MapToolError::config("Request timeout cannot be zero").into());
        }

        if self.provider.timeout_seconds > 300 {
            return Err(MapToolError::config("Request timeout cannot exceed 300 seconds").into());
        }

        if self.provider.max_results == 0 {
            return Err(MapToolError::config("Maximum search results cannot be zero").into());
        }

        if self.provider.max_results > 100 {
            return Err(MapToolError::config("Maximum search results cannot exceed 100").into());
        }

        Ok(())
    }

    /// Validate the base URL and endpoint paths
    fn validate_urls_and_paths(&self) -> Result<()> {
        if !self.provider.base_url.starts_with("http://")
            && !self.provider.base_url.starts_with("https://")
        {
            return Err(MapToolError::config(
                "Provider base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        let endpoints = &self.provider.endpoints;
        for path in [
            &endpoints.geocoding,
            &endpoints.reverse_geocoding,
            &endpoints.place_search,
            &endpoints.route_matrix,
            &endpoints.direction,
        ] {
            if !path.starts_with('/') {
                return Err(MapToolError::config(format!(
                    "Endpoint path '{path}' must start with '/'"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that read or mutate process environment variables must not
    // overlap; `load_from_path` always layers the environment source.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let config = MapToolConfig::default();
        assert_eq!(config.provider.base_url, "https://api.map.baidu.com");
        assert_eq!(config.provider.timeout_seconds, 10);
        assert_eq!(config.provider.max_results, 20);
        assert_eq!(config.provider.endpoints.geocoding, "/geocoding/v3/");
        assert_eq!(config.fallback.formula, FallbackFormula::Planar);
        assert_eq!(config.logging.level, "info");
        assert!(!config.is_provider_configured());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = MapToolConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_update_api_key_takes_effect() {
        let mut config = MapToolConfig::default();
        config.update_api_key("valid_api_key_123");
        assert!(config.is_provider_configured());
        assert_eq!(config.provider.api_key, "valid_api_key_123");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_short_api_key_rejected() {
        let mut config = MapToolConfig::default();
        config.update_api_key("short");
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_numeric_range_validation() {
        let mut config = MapToolConfig::default();
        config.provider.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("300 seconds"));

        let mut config = MapToolConfig::default();
        config.provider.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_validation() {
        let mut config = MapToolConfig::default();
        config.provider.base_url = "ftp://api.map.example.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("HTTP or HTTPS"));
    }

    #[test]
    fn test_endpoint_path_validation() {
        let mut config = MapToolConfig::default();
        config.provider.endpoints.direction = "direction/v2/driving".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_secondary_provider_defaults_present_but_unconfigured() {
        let config = MapToolConfig::default();
        assert_eq!(config.secondary.base_url, "https://maps.googleapis.com");
        assert!(config.secondary.api_key.is_empty());
    }

    #[test]
    fn test_documented_env_override_lands_in_provider_key() {
        let _guard = ENV_LOCK.lock().unwrap();

        // SAFETY: test environment, setting test values only
        unsafe {
            std::env::set_var("MAPTOOL_PROVIDER__API_KEY", "documented_key_123");
        }

        let result = MapToolConfig::load_from_path(Some(PathBuf::from(
            "/nonexistent/maptool-env-test.toml",
        )));

        // SAFETY: test cleanup
        unsafe {
            std::env::remove_var("MAPTOOL_PROVIDER__API_KEY");
        }

        let config = result.unwrap();
        assert_eq!(config.provider.api_key, "documented_key_123");
        assert!(config.is_provider_configured());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let _guard = ENV_LOCK.lock().unwrap();
        let dir = std::env::temp_dir().join("maptool-config-test");
        let path = dir.join("config.toml");
        let mut config = MapToolConfig::default();
        config.update_api_key("persisted_key_123");
        config.fallback.formula = FallbackFormula::Haversine;
        config.save_to_path(&path).unwrap();

        let reloaded = MapToolConfig::load_from_path(Some(path.clone())).unwrap();
        assert_eq!(reloaded.provider.api_key, "persisted_key_123");
        assert_eq!(reloaded.fallback.formula, FallbackFormula::Haversine);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_config_path_generation() {
        let path = MapToolConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("maptool"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
