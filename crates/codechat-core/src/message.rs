//! Chat messages.
//!
//! A message is created once, when it is sent or received, and never
//! changes afterwards. Rendering derives everything else from its text.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text of the placeholder shown while a reply is outstanding.
pub const THINKING_TEXT: &str = "Thinking...";

/// Unique identifier for a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    /// Class name used on the message container.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in the chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: MessageId,
    role: Role,
    text: String,
    timestamp: DateTime<Local>,
    /// True for the placeholder standing in for an outstanding reply.
    #[serde(default)]
    pending: bool,
}

impl ChatMessage {
    /// Creates a message stamped with the current local time.
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self::with_timestamp(role, text, Local::now())
    }

    pub fn with_timestamp(role: Role, text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            id: MessageId::new(),
            role,
            text: text.into(),
            timestamp,
            pending: false,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, text)
    }

    /// The system placeholder shown while waiting for a reply.
    pub fn thinking() -> Self {
        Self {
            pending: true,
            ..Self::system(THINKING_TEXT)
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Formats the timestamp, e.g. `"%H:%M"` → `"09:41"`.
    pub fn time_label(&self, format: &str) -> String {
        self.timestamp.format(format).to_string()
    }
}
