//! LLM provider abstraction
//!
//! Provides a common interface for chat-completion providers plus the
//! wrappers every production stack goes through.

mod cache;
mod config;
mod error;
mod openai;
mod types;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub mod testing;

pub use cache::CachingService;
pub use config::{connect, ConfigError, LlmConfig};
pub use error::{LlmError, LlmErrorKind};
pub use openai::OpenAIService;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Short provider name used in logs
    fn provider_name(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
}

impl LoggingService {
    #[must_use]
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    provider = %self.inner.provider_name(),
                    model = %request.model,
                    function = ?request.function_call,
                    messages = request.messages.len(),
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    provider = %self.inner.provider_name(),
                    model = %request.model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockLlmService;
    use super::*;

    #[tokio::test]
    async fn test_logging_passes_through_response() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_response(LlmResponse::text("hello"));
        let service = LoggingService::new(mock.clone());

        let request = LlmRequest::new("gpt-4", vec![Message::user("hi")]);
        let response = service.complete(&request).await.unwrap();

        assert_eq!(response.reply, Reply::Text("hello".to_string()));
        assert_eq!(mock.recorded_requests().len(), 1);
        assert_eq!(service.provider_name(), "mock");
    }

    #[tokio::test]
    async fn test_logging_passes_through_error_unchanged() {
        let mock = Arc::new(MockLlmService::new());
        mock.queue_error(LlmError::rate_limit("slow down"));
        let service = LoggingService::new(mock);

        let request = LlmRequest::new("gpt-4", vec![Message::user("hi")]);
        let err = service.complete(&request).await.unwrap_err();

        assert_eq!(err.kind, LlmErrorKind::RateLimit);
        assert_eq!(err.message, "slow down");
    }
}
