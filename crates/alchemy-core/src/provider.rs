//! Boundary to the generative-text provider.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Everything a provider needs to run one fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionRequest {
    /// Fixed creative framing, identical for every call.
    pub system_instruction: String,
    /// Per-call instruction naming both input symbols.
    pub user_instruction: String,
    /// Structured-output schema the answer must follow.
    pub response_schema: Value,
}

/// Failure reported by a provider implementation.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProviderError {
    /// The request never produced an HTTP response.
    #[error("request failed: {message}")]
    Request { message: String, is_retryable: bool },

    /// The provider answered with a non-success status.
    #[error("HTTP {status_code}: {message}")]
    Http {
        status_code: u16,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The provider answered successfully but without any text.
    #[error("provider returned no text")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { is_retryable, .. } | Self::Http { is_retryable, .. } => *is_retryable,
            Self::EmptyResponse | Self::Other(_) => false,
        }
    }
}

/// A generative-text backend able to answer a [`FusionRequest`].
///
/// Implementations return the raw structured text; parsing and validation
/// belong to the caller. One call to `generate` is one outbound request.
#[async_trait::async_trait]
pub trait FusionProvider: Send + Sync {
    /// Short human-readable backend name for logs.
    fn name(&self) -> &str;

    async fn generate(&self, request: &FusionRequest) -> Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_flags() {
        let timeout = ProviderError::Request {
            message: "timed out".into(),
            is_retryable: true,
        };
        let throttled = ProviderError::Http {
            status_code: 429,
            message: "RESOURCE_EXHAUSTED: quota".into(),
            is_retryable: true,
            retry_after: Some(Duration::from_secs(3)),
        };
        assert!(timeout.is_retryable());
        assert!(throttled.is_retryable());
        assert!(!ProviderError::EmptyResponse.is_retryable());
        assert_eq!(throttled.to_string(), "HTTP 429: RESOURCE_EXHAUSTED: quota");
    }
}
