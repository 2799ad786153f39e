//! In-memory response cache honoring the request cache hint

use super::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Answers repeated cache-eligible requests without calling the provider.
///
/// Only requests with `cache == true` are looked up or stored, and only
/// successful responses are kept. Entries live as long as the service.
pub struct CachingService {
    inner: Arc<dyn LlmService>,
    entries: Mutex<HashMap<String, LlmResponse>>,
}

impl CachingService {
    #[must_use]
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        Self {
            inner,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<LlmResponse> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn store(&self, key: String, response: LlmResponse) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, response);
    }
}

/// Hex SHA-256 of the serialized request
fn cache_key(request: &LlmRequest) -> Option<String> {
    let bytes = serde_json::to_vec(request).ok()?;
    Some(format!("{:x}", Sha256::digest(&bytes)))
}

#[async_trait]
impl LlmService for CachingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let Some(key) = request.cache.then(|| cache_key(request)).flatten() else {
            return self.inner.complete(request).await;
        };

        if let Some(hit) = self.lookup(&key) {
            tracing::debug!(model = %request.model, key = %key, "LLM cache hit");
            return Ok(hit);
        }

        let response = self.inner.complete(request).await?;
        self.store(key, response.clone());
        Ok(response)
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
