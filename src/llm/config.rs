//! Provider configuration and stack assembly

use super::{CachingService, LlmError, LlmService, LoggingService, OpenAIService};
use std::sync::Arc;
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gpt-4";

/// Configuration for the LLM provider
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai_api_key: Option<String>,
    /// Gateway URL; when set the gateway handles authentication
    pub gateway: Option<String>,
    /// Model used for every request of a dialogue
    pub model: String,
    /// Whether cache-eligible requests may be answered from memory
    pub cache: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            gateway: None,
            model: DEFAULT_MODEL.to_string(),
            cache: true,
        }
    }
}

impl LlmConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            gateway: non_empty("LLM_GATEWAY"),
            model: non_empty("DEFAULT_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            cache: !matches!(
                lookup("LLM_CACHE").map(|v| v.trim().to_ascii_lowercase()).as_deref(),
                Some("0" | "false" | "off" | "no")
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no LLM credentials configured; set OPENAI_API_KEY or LLM_GATEWAY")]
    MissingCredentials,
    #[error("failed to build LLM provider: {0}")]
    Provider(#[from] LlmError),
}

/// Build the provider stack described by `config`.
///
/// Requests flow through the cache (when enabled), then logging, then the
/// `OpenAI` service.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] when neither an API key nor a
/// gateway is configured, and [`ConfigError::Provider`] when the HTTP client
/// cannot be built.
pub fn connect(config: &LlmConfig) -> Result<Arc<dyn LlmService>, ConfigError> {
    // In gateway mode, use "implicit" as the API key
    let api_key = match (&config.gateway, &config.openai_api_key) {
        (Some(_), _) => "implicit".to_string(),
        (None, Some(key)) => key.clone(),
        (None, None) => return Err(ConfigError::MissingCredentials),
    };

    let provider: Arc<dyn LlmService> =
        Arc::new(OpenAIService::new(api_key, config.gateway.as_deref())?);
    let logged: Arc<dyn LlmService> = Arc::new(LoggingService::new(provider));

    if config.cache {
        Ok(Arc::new(CachingService::new(logged)))
    } else {
        Ok(logged)
    }
}
