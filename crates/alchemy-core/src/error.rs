//! Error types for Emoji Alchemy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fusion::ValidationError;
use crate::provider::ProviderError;

/// A shared error type for the alchemy crates.
///
/// Provider and schema failures never reach the session controller: the
/// fusion service folds them into the fallback result. This type is what the
/// service sees internally and what the command line reports in strict mode.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum AlchemyError {
    /// Configuration error (missing API key, unreadable config file)
    #[error("Configuration error: {0}")]
    Config(String),

    /// The generative-text provider failed
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// The provider answered, but the payload breaks a result invariant
    #[error("Invalid fusion result: {0}")]
    Validation(#[from] ValidationError),

    /// A symbol was empty or otherwise unusable as fusion input
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AlchemyError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error came from the payload rather than the transport.
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Serialization { .. })
    }
}

impl From<std::io::Error> for AlchemyError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AlchemyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AlchemyError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, AlchemyError>`.
pub type Result<T> = std::result::Result<T, AlchemyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_is_schema_violation() {
        let err: AlchemyError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(err.is_schema_violation());
        assert!(err.to_string().starts_with("Serialization error: JSON"));
    }

    #[test]
    fn test_provider_error_is_not_schema_violation() {
        let err: AlchemyError = ProviderError::EmptyResponse.into();
        assert!(!err.is_schema_violation());
        assert!(!err.is_config());
    }
}
