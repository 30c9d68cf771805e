//! Error types and handling for the `maptool` application

use thiserror::Error;

/// Main error type for the `maptool` application
#[derive(Error, Debug)]
pub enum MapToolError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Provider API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl MapToolError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            MapToolError::Config { .. } => {
                "Configuration error. Please check your config file and API key.".to_string()
            }
            MapToolError::Api { .. } => {
                "Unable to reach the map provider. Please check your internet connection."
                    .to_string()
            }
            MapToolError::Validation { message } => {
                format!("Invalid input: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = MapToolError::config("missing API key");
        assert!(matches!(config_err, MapToolError::Config { .. }));

        let api_err = MapToolError::api("connection failed");
        assert!(matches!(api_err, MapToolError::Api { .. }));

        let validation_err = MapToolError::validation("invalid coordinates");
        assert!(matches!(validation_err, MapToolError::Validation { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = MapToolError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = MapToolError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));

        let validation_err = MapToolError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }
}
