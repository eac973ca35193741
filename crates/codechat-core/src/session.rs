//! The chat transcript and the send/reply cycle.
//!
//! Sending is split in two so the caller controls concurrency:
//! [`ChatSession::submit`] records the user message and a placeholder and
//! hands back a [`PendingReply`]; [`ChatSession::resolve`] later swaps that
//! exact placeholder for the reply. Several replies may be outstanding and
//! they may resolve in any order.

use crate::config::ProviderConfig;
use crate::message::{ChatMessage, MessageId};
use crate::provider::{ModelProvider, ProviderError};

const MISSING_KEY_MESSAGE: &str = "Please enter your API key first.";

/// An outstanding reply, carrying everything needed to request it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    placeholder: MessageId,
    prompt: String,
    api_key: String,
    model: String,
}

impl PendingReply {
    pub fn placeholder(&self) -> MessageId {
        self.placeholder
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Performs the provider call for this reply.
    pub async fn request<P: ModelProvider>(&self, provider: &P) -> Result<String, ProviderError> {
        provider.complete(&self.prompt, &self.api_key, &self.model).await
    }
}

/// Ordered chat transcript plus the credentials used to extend it.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    api_key: Option<String>,
    model: String,
}

impl ChatSession {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            api_key: None,
            model: model.into(),
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self {
            api_key: config.resolve_api_key(),
            ..Self::new(config.model.clone())
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.set_api_key(Some(api_key.into()));
        self
    }

    pub fn set_api_key(&mut self, api_key: Option<String>) {
        self.api_key = api_key.filter(|key| !key.trim().is_empty());
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of replies still outstanding.
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// Records a user message and a placeholder for its reply.
    ///
    /// Returns `None` when the text is blank or when no API key is set; in
    /// the latter case a system message asks for one.
    pub fn submit(&mut self, text: &str) -> Option<PendingReply> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let Some(api_key) = self.api_key.clone() else {
            tracing::debug!("Message not sent: no API key");
            self.messages.push(ChatMessage::system(MISSING_KEY_MESSAGE));
            return None;
        };

        self.messages.push(ChatMessage::user(text));
        let placeholder = ChatMessage::thinking();
        let pending = PendingReply {
            placeholder: placeholder.id(),
            prompt: text.to_string(),
            api_key,
            model: self.model.clone(),
        };
        self.messages.push(placeholder);
        Some(pending)
    }

    /// Replaces the placeholder of `pending` with the outcome of its request.
    ///
    /// Returns `None` without adding a reply when the placeholder is already
    /// gone, so a cloned handle cannot resolve twice.
    pub fn resolve(&mut self, pending: PendingReply, result: Result<String, ProviderError>) -> Option<&ChatMessage> {
        let before = self.messages.len();
        self.messages.retain(|m| m.id() != pending.placeholder);
        if self.messages.len() == before {
            tracing::debug!("Reply for {:?} already resolved", pending.placeholder);
            return None;
        }

        let text = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("Provider request failed: {}", e);
                format!("Error: {e}")
            }
        };
        self.messages.push(ChatMessage::assistant(text));
        self.messages.last()
    }

    /// Submits `text` and waits for the reply.
    pub async fn ask<P: ModelProvider>(&mut self, provider: &P, text: &str) -> Option<&ChatMessage> {
        let pending = self.submit(text)?;
        let result = pending.request(provider).await;
        self.resolve(pending, result)
    }
}
