//! Error types and handling for the `MuseAtlas` pipeline

use thiserror::Error;

/// Main error type for the `MuseAtlas` pipeline
#[derive(Error, Debug)]
pub enum AtlasError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors (open data, routing)
    #[error("API error: {message}")]
    Api { message: String },

    /// Scraping/parsing errors on fetched HTML
    #[error("Scrape error: {message}")]
    Scrape { message: String },

    /// Geometry errors (missing or malformed polygons)
    #[error("Geometry error: {message}")]
    Geometry { message: String },

    /// Input validation errors at record boundaries
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl AtlasError {
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

    /// Create a new scrape error
    pub fn scrape<S: Into<String>>(message: S) -> Self {
        Self::Scrape {
            message: message.into(),
        }
    }

    /// Create a new geometry error
    pub fn geometry<S: Into<String>>(message: S) -> Self {
        Self::Geometry {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AtlasError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            AtlasError::Api { message } => {
                format!("Unable to query an external service: {message}")
            }
            AtlasError::Scrape { .. } => {
                "Failed to parse a fetched page. The source layout may have changed.".to_string()
            }
            AtlasError::Geometry { message } => {
                format!("Geometry problem: {message}")
            }
            AtlasError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            AtlasError::Io { .. } => {
                "File operation failed. Please check paths and permissions.".to_string()
            }
            AtlasError::General { message } => message.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = AtlasError::config("missing API key");
        assert!(matches!(config_err, AtlasError::Config { .. }));

        let api_err = AtlasError::api("routing request failed");
        assert!(matches!(api_err, AtlasError::Api { .. }));

        let validation_err = AtlasError::validation("record without coordinates");
        assert!(matches!(validation_err, AtlasError::Validation { .. }));

        let geometry_err = AtlasError::geometry("no 600 s polygon");
        assert!(matches!(geometry_err, AtlasError::Geometry { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = AtlasError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let api_err = AtlasError::api("HTTP 502");
        assert!(api_err.user_message().contains("HTTP 502"));

        let validation_err = AtlasError::validation("test input");
        assert!(validation_err.user_message().contains("test input"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let atlas_err: AtlasError = io_err.into();
        assert!(matches!(atlas_err, AtlasError::Io { .. }));
    }
}
