//! Multi-provider LLM client for generation and validation calls.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AiConfig, AppConfig, ConfigError, ProviderKind};

/// Connection timeout for HTTP requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Hard cap for a single HTTP request; the client-level timeout is usually tighter.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Build an HTTP client with proper timeout configuration.
fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Determine if a request should be retried based on status code and attempt count.
fn should_retry(status_code: u16, attempt: u32) -> bool {
    if attempt >= MAX_RETRIES {
        return false;
    }
    // Retry on 5xx server errors
    (500..600).contains(&status_code)
}

/// Calculate exponential backoff duration for retry attempts.
fn calculate_backoff(attempt: u32) -> Duration {
    // Exponential backoff: 1s, 2s, 4s
    Duration::from_secs(1 << attempt)
}

fn map_send_error(e: &reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::RequestFailed(e.to_string())
    }
}

/// Errors from LLM completion calls.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(String),
    #[error("API request failed: {0}")]
    RequestFailed(String),
    #[error("Rate limited by provider")]
    RateLimited,
    #[error("Failed to parse response: {0}")]
    ParseError(String),
    #[error("LLM request timed out")]
    Timeout,
    #[error("Error generating {label}: {source}")]
    Content {
        label: &'static str,
        #[source]
        source: Box<GenerationError>,
    },
}

/// Per-call sampling parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Trait for LLM providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a single-turn prompt.
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, GenerationError>;
}

/// OpenAI-compatible chat completions provider (OpenRouter, vLLM, Ollama, ...).
#[derive(Debug, Clone)]
pub struct OpenRouterProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageResponse,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    content: Option<String>,
}

impl OpenRouterProvider {
    /// Create a new OpenAI-compatible provider.
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: build_http_client(),
            base_url,
            api_key,
        }
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LlmProvider for OpenRouterProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        let url = self.chat_completions_url();
        let body = ChatRequest {
            model: &params.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
                .header(header::CONTENT_TYPE, "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| map_send_error(&e))?;

            let status = response.status();
            if status.is_success() {
                let chat: ChatResponse = response
                    .json()
                    .await
                    .map_err(|e| GenerationError::ParseError(e.to_string()))?;

                return chat
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| {
                        GenerationError::ParseError("No choices in completion response".to_string())
                    });
            }

            let status_code = status.as_u16();
            if status_code == 429 {
                return Err(GenerationError::RateLimited);
            }
            if should_retry(status_code, attempt) {
                let backoff = calculate_backoff(attempt);
                tracing::debug!(status = status_code, ?backoff, "Retrying completion request");
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!("HTTP {status}: {text}")));
        }
    }
}

/// Claude API provider.
#[derive(Debug, Clone)]
pub struct ClaudeProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ClaudeProvider {
    /// Create a new Claude provider.
    #[must_use]
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: build_http_client(),
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LlmProvider for ClaudeProvider {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let body = serde_json::json!({
            "model": params.model,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
            "messages": [{
                "role": "user",
                "content": prompt
            }]
        });

        let mut attempt = 0;
        loop {
            let response = self
                .client
                .post(&url)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", "2023-06-01")
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| map_send_error(&e))?;

            let status = response.status();
            if status.is_success() {
                let json: serde_json::Value = response
                    .json()
                    .await
                    .map_err(|e| GenerationError::ParseError(e.to_string()))?;

                // Extract text from Claude response format
                return json["content"][0]["text"]
                    .as_str()
                    .map(String::from)
                    .ok_or_else(|| {
                        GenerationError::ParseError("No text in Claude response".to_string())
                    });
            }

            let status_code = status.as_u16();
            if status_code == 429 {
                return Err(GenerationError::RateLimited);
            }
            if should_retry(status_code, attempt) {
                let backoff = calculate_backoff(attempt);
                tokio::time::sleep(backoff).await;
                attempt += 1;
                continue;
            }

            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!("HTTP {status}: {text}")));
        }
    }
}

/// Provider enum for dispatch.
#[derive(Debug, Clone)]
pub enum Provider {
    OpenRouter(OpenRouterProvider),
    Claude(ClaudeProvider),
}

#[async_trait]
impl LlmProvider for Provider {
    async fn complete(
        &self,
        prompt: &str,
        params: &CompletionParams,
    ) -> Result<String, GenerationError> {
        match self {
            Self::OpenRouter(p) => p.complete(prompt, params).await,
            Self::Claude(p) => p.complete(prompt, params).await,
        }
    }
}

impl Provider {
    /// Build the configured provider, reading the API key from the environment.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::MissingApiKey` if the configured API key
    /// environment variable is not set.
    pub fn from_config(config: &AiConfig) -> Result<Self, GenerationError> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| GenerationError::MissingApiKey(config.api_key_env.clone()))?;

        Ok(match config.provider {
            ProviderKind::OpenRouter => {
                Self::OpenRouter(OpenRouterProvider::new(config.base_url.clone(), api_key))
            }
            ProviderKind::Claude => {
                Self::Claude(ClaudeProvider::new(config.base_url.clone(), api_key))
            }
        })
    }
}

/// Errors raised while wiring up an [`LlmClient`].
#[derive(Error, Debug)]
pub enum ClientSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Provider(#[from] GenerationError),
}

/// Shared handle to a provider bound to a model and a per-call timeout.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LlmProvider>,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for LlmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmClient")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LlmClient {
    /// Create a client around any provider.
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            provider,
            model: model.into(),
            timeout,
        }
    }

    /// Create a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns `ClientSetupError::Config` for an unknown model alias and
    /// `ClientSetupError::Provider` when the API key is missing.
    pub fn from_config(config: &AppConfig) -> Result<Self, ClientSetupError> {
        let model = config.model_id()?;
        let provider = Provider::from_config(&config.ai)?;
        Ok(Self::new(
            Arc::new(provider),
            model,
            Duration::from_secs(config.ai.timeout_secs),
        ))
    }

    /// Get the configured model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one completion, bounded by the client timeout.
    ///
    /// # Errors
    ///
    /// Returns the provider's error, or `GenerationError::Timeout` on expiry.
    pub async fn complete(
        &self,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, GenerationError> {
        let params = CompletionParams {
            model: self.model.clone(),
            temperature,
            max_tokens,
        };
        tokio::time::timeout(self.timeout, self.provider.complete(prompt, &params))
            .await
            .map_err(|_| GenerationError::Timeout)?
    }
}
