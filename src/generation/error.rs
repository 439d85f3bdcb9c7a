// Error taxonomy for the generation pipeline

use thiserror::Error;

/// Errors surfaced by the generation pipeline.
///
/// Retry classification deviates from the original blanket policy on
/// purpose: clearly non-retryable provider responses (bad request, auth)
/// fail fast instead of burning the retry budget.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Caller-supplied input is malformed (e.g. missing issue key)
    #[error("Invalid generation input: {0}")]
    Validation(String),

    /// The generation API answered with a non-success status
    #[error("Generation API error: {message}")]
    Provider {
        status: Option<u16>,
        message: String,
    },

    /// Transport-level failure talking to the generation API
    #[error("Network error calling generation API: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider responded successfully but with no usable text
    #[error("Generation API returned no usable text")]
    EmptyResponse,

    /// The persistence boundary rejected a record operation
    #[error("Storage error: {0}")]
    Storage(String),
}

impl GenerationError {
    /// Build a provider error, folding the status into the message
    pub fn provider(status: Option<u16>, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = match status {
            Some(status) => format!("({}) {}", status, body),
            None => body,
        };
        GenerationError::Provider { status, message }
    }

    /// Whether the retry policy should try again after this error.
    ///
    /// Network failures, rate limits, overload and empty responses are
    /// transient; malformed requests, auth failures and validation errors
    /// are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Validation(_) => false,
            GenerationError::Storage(_) => false,
            GenerationError::Network(_) => true,
            GenerationError::EmptyResponse => true,
            GenerationError::Provider { status, .. } => match status {
                Some(code) => matches!(code, 408 | 429) || *code >= 500,
                // No status means we never got a well-formed reply
                None => true,
            },
        }
    }
}
