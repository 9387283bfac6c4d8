use serde::{Deserialize, Serialize};

use crate::citation::Citation;

/// Conversation roles understood by the generation server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One entry of the `messages` array sent to the generation server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Final assembled answer of a completed stream
///
/// Serializes as `{ "role": "assistant", "content": ..., "citations": [...] }`,
/// with `citations` omitted when none were received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citations: Option<Vec<Citation>>,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>, citations: Vec<Citation>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations: if citations.is_empty() {
                None
            } else {
                Some(citations)
            },
        }
    }

    pub fn citations(&self) -> &[Citation] {
        self.citations.as_deref().unwrap_or_default()
    }
}

impl From<&AssistantMessage> for ChatMessage {
    fn from(message: &AssistantMessage) -> Self {
        ChatMessage::assistant(message.content.clone())
    }
}
