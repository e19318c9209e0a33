use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::ProviderSettings;

pub mod claude;
pub mod retry;

#[cfg(test)]
pub(crate) mod mock;

pub use claude::{ClaudeProvider, ClaudeReply};
pub use retry::{RetryPolicy, RetryingProvider};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AIError {
    #[error("Rate limited")]
    RateLimited,
    #[error("Authentication failed")]
    Unauthorized,
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Server error (HTTP {status}): {body}")]
    ServerError { status: u16, body: String },
    #[error("Request timed out")]
    Timeout,
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("No text content in response")]
    EmptyResponse,
    #[error("API error ({kind}): {message}")]
    Api { kind: String, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Provider not supported: {0}")]
    UnsupportedProvider(String),
}

impl AIError {
    /// Only rate limiting is worth retrying; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AIError::RateLimited)
    }
}

impl From<reqwest::Error> for AIError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            AIError::Timeout
        } else {
            AIError::Network(e.to_string())
        }
    }
}

/// A remote service that turns a rendered prompt into analysis text.
///
/// Implementations make exactly one attempt per call; retrying is left to
/// [`RetryingProvider`].
#[async_trait::async_trait]
pub trait AnalysisProvider: Send + Sync {
    async fn send(&self, prompt: &str) -> Result<String, AIError>;
    fn provider_name(&self) -> &str;
}

pub fn create_provider(
    provider_name: &str,
    api_key: &str,
    settings: &ProviderSettings,
) -> Result<Arc<dyn AnalysisProvider>, AIError> {
    info!(
        "Creating analysis provider: {} with model: {:?}",
        provider_name, settings.model
    );
    match provider_name.to_lowercase().as_str() {
        "claude" | "anthropic" => {
            debug!("Initializing Claude/Anthropic provider");
            let mut provider = ClaudeProvider::new(api_key.to_string());
            if let Some(model) = &settings.model {
                provider = provider.with_model(model.clone());
            }
            if let Some(max_tokens) = settings.max_tokens {
                provider = provider.with_max_tokens(max_tokens);
            }
            if let Some(timeout) = settings.timeout {
                provider = provider.with_timeout(timeout);
            }
            if let Some(base_url) = &settings.base_url {
                provider = provider.with_base_url(base_url.clone());
            }
            Ok(Arc::new(provider))
        }
        _ => {
            error!("Unsupported analysis provider: {}", provider_name);
            Err(AIError::UnsupportedProvider(provider_name.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(AIError::RateLimited.is_retryable());
        assert!(!AIError::Unauthorized.is_retryable());
        assert!(!AIError::Timeout.is_retryable());
        assert!(!AIError::ServerError {
            status: 503,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_create_provider_by_name() {
        let settings = ProviderSettings::default();
        let provider = create_provider("Anthropic", "key", &settings).unwrap();
        assert_eq!(provider.provider_name(), "claude");

        match create_provider("openrouter", "key", &settings) {
            Err(AIError::UnsupportedProvider(name)) => assert_eq!(name, "openrouter"),
            other => panic!("expected UnsupportedProvider, got {:?}", other.map(|_| ())),
        }
    }
}
