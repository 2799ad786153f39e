//! Errors surfaced by dialogue and extraction operations

use crate::extract::TemplateError;
use crate::llm::LlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReasonerError {
    /// The format template is unusable; raised before any provider call
    #[error("invalid format template: {0}")]
    Usage(#[from] TemplateError),

    /// The provider answered with the wrong kind of reply
    #[error("unexpected response from model: {content}")]
    UnexpectedResponse { content: String },

    /// A forced function call came back without any arguments
    #[error("function call carried no value for '{field}'")]
    MissingArgument { field: String },

    /// Provider failure, passed through untouched
    #[error(transparent)]
    Provider(#[from] LlmError),

    /// The extracted value does not fit the requested Rust type
    #[error("failed to decode extracted value: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ReasonerError {
    #[must_use]
    pub fn is_usage(&self) -> bool {
        matches!(self, ReasonerError::Usage(_))
    }
}
