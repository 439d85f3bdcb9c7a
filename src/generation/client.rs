// Generation client - calls the external API with bounded retry and
// exponential backoff, and computes deterministic cost/usage accounting.

use super::error::GenerationError;
use super::pricing::compute_cost;
use super::request::ChatRequest;
use crate::models::{GenerationResult, TokenUsage};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Maximum number of retries after the initial attempt (4 attempts total)
pub const MAX_RETRIES: u32 = 3;

// ============================================================================
// Wire Types (provider response)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: UsageBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Provider-reported usage block
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageBlock {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

// ============================================================================
// Transport
// ============================================================================

/// One round trip to the generation API. Split out as a trait so tests can
/// count attempts without a network.
pub trait ChatTransport: Send + Sync {
    fn send(
        &self,
        request: &ChatRequest,
    ) -> impl std::future::Future<Output = Result<ChatResponse, GenerationError>> + Send;
}

/// Production transport backed by reqwest
pub struct HttpTransport {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl HttpTransport {
    pub fn new(api_base: String, api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base,
            api_key,
        }
    }
}

impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, GenerationError> {
        let url = format!(
            "{}/chat/completions",
            self.api_base.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::provider(Some(status), text));
        }

        Ok(response.json::<ChatResponse>().await?)
    }
}

// ============================================================================
// Client
// ============================================================================

/// Retrying client around a [`ChatTransport`].
///
/// Backoff waits are plain `tokio::time::sleep` suspensions: they block only
/// the logical request they belong to, and paused test clocks drive them.
pub struct GenerationClient<T: ChatTransport> {
    transport: T,
    max_retries: u32,
}

impl GenerationClient<HttpTransport> {
    /// Production client over HTTP, wired from resolved configuration
    pub fn new(config: &crate::config::GenerationConfig) -> Self {
        Self::with_transport(HttpTransport::new(
            config.api_base.clone(),
            config.api_key.clone(),
        ))
    }
}

impl<T: ChatTransport> GenerationClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            max_retries: MAX_RETRIES,
        }
    }

    /// Issue the request, retrying transient failures with exponential
    /// backoff (`2^attempt * 1000ms`, attempt counted from 1). Surfaces the
    /// last underlying error once the retry budget is exhausted; terminal
    /// errors are surfaced immediately.
    pub async fn generate(&self, request: &ChatRequest) -> Result<GenerationResult, GenerationError> {
        let mut attempt: u32 = 1;
        loop {
            match self.attempt_once(request).await {
                Ok(result) => return Ok(result),
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    if attempt > self.max_retries {
                        log::error!(
                            "Generation for model {} failed after {} attempts: {}",
                            request.model,
                            attempt,
                            e
                        );
                        return Err(e);
                    }
                    let delay = Duration::from_millis(1000 * 2u64.pow(attempt));
                    log::warn!(
                        "Generation attempt {} failed, retrying in {:?}: {}",
                        attempt,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt_once(&self, request: &ChatRequest) -> Result<GenerationResult, GenerationError> {
        let response = self.transport.send(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .unwrap_or_default()
            .trim()
            .to_string();

        // An empty payload is a failure subject to the same retry policy
        if content.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        let token_usage = TokenUsage {
            prompt_tokens: response.usage.prompt_tokens,
            completion_tokens: response.usage.completion_tokens,
            total_tokens: response.usage.total_tokens,
        };
        let cost = compute_cost(&request.model, &token_usage);

        Ok(GenerationResult {
            content,
            token_usage,
            cost,
        })
    }
}
