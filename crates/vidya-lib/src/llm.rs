//! Chat-completion client for Groq's OpenAI-compatible API.
//!
//! One request per call: no streaming, no retries. Callers decide what to
//! do on failure (the chat service substitutes a canned reply).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use tracing::debug;

use vidya_core::prompt::PromptMessage;

use crate::config::GroqConfig;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("{0} API key not configured")]
    NotConfigured(&'static str),
    #[error("chat completion request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat completion failed: {status} - {body}")]
    Status { status: u16, body: String },
    #[error("chat completion returned no content")]
    EmptyResponse,
}

/// A model that turns a message list into a reply.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Provider identifier (e.g. "groq").
    fn id(&self) -> &'static str;

    /// Whether an API key (or equivalent) is present.
    fn is_configured(&self) -> bool;

    /// Generate the assistant's reply to `messages`.
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError>;
}

/// Groq chat-completion client.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: Option<Secret<String>>,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClient")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GroqClient {
    pub fn new(config: &GroqConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn api_key(&self) -> Result<&Secret<String>, LlmError> {
        self.api_key.as_ref().ok_or(LlmError::NotConfigured("Groq"))
    }
}

#[async_trait]
impl ChatModel for GroqClient {
    fn id(&self) -> &'static str {
        "groq"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
        let api_key = self.api_key()?;

        let body = CompletionRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(
            "groq: POST {} messages to {}",
            messages.len(),
            self.model
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key.expose_secret())
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status, body });
        }

        let completion: CompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
