//! Model providers: where chat replies come from.
//!
//! A provider turns one user message into one reply string. Calls are not
//! retried and carry no timeout; a failure becomes a single
//! [`ProviderError`] whose text is shown in the chat.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::config::{ProviderConfig, ProviderKind};

const OPENAI_EMPTY_REPLY: &str = "[OpenAI] No response.";
const CLAUDE_PLACEHOLDER_REPLY: &str = "[Claude] This is a placeholder response.";

/// Errors from a provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("OpenAI API error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("{0}")]
    Request(#[from] reqwest::Error),
}

/// Produces a reply to a chat message.
pub trait ModelProvider {
    fn complete(
        &self,
        message: &str,
        api_key: &str,
        model: &str,
    ) -> impl Future<Output = Result<String, ProviderError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [RequestMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Choice {
    message: Option<ReplyMessage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReplyMessage {
    content: Option<String>,
}

impl ChatResponse {
    /// Trimmed content of the first choice, or the empty-reply marker.
    fn into_reply(self) -> String {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.is_empty())
            .map(|content| content.trim().to_string())
            .unwrap_or_else(|| OPENAI_EMPTY_REPLY.to_string())
    }
}

/// OpenAI-compatible chat completions over HTTP.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiProvider {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ModelProvider for OpenAiProvider {
    async fn complete(&self, message: &str, api_key: &str, model: &str) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model,
            messages: [RequestMessage {
                role: "user",
                content: message,
            }],
        };

        tracing::info!("Sending chat request to {} (model {})", self.endpoint, model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Chat request failed with {}", status);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let data: ChatResponse = response.json().await?;
        Ok(data.into_reply())
    }
}

/// Claude backend; answers with a fixed placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeProvider;

impl ModelProvider for ClaudeProvider {
    async fn complete(&self, _message: &str, _api_key: &str, model: &str) -> Result<String, ProviderError> {
        tracing::debug!("Claude provider (model {}) returns a placeholder", model);
        Ok(CLAUDE_PLACEHOLDER_REPLY.to_string())
    }
}

/// The provider selected by configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredProvider {
    OpenAi(OpenAiProvider),
    Claude(ClaudeProvider),
}

impl ConfiguredProvider {
    pub fn from_config(config: &ProviderConfig) -> Self {
        match config.kind {
            ProviderKind::OpenAi => Self::OpenAi(OpenAiProvider::new(config.endpoint.clone())),
            ProviderKind::Claude => Self::Claude(ClaudeProvider),
        }
    }
}

impl ModelProvider for ConfiguredProvider {
    async fn complete(&self, message: &str, api_key: &str, model: &str) -> Result<String, ProviderError> {
        match self {
            Self::OpenAi(provider) => provider.complete(message, api_key, model).await,
            Self::Claude(provider) => provider.complete(message, api_key, model).await,
        }
    }
}
