use serde::{Deserialize, Serialize};

use crate::citation::Citation;
use crate::message::AssistantMessage;

/// Lifecycle of one streamed response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Active,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Completed, Cancelled and Failed never transition again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Progress of a stream session, for consumers that read it over a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Snapshot of the accumulated answer after a text-changing payload
    Text {
        content: String,
    },

    /// The citation list was replaced
    Citations {
        citations: Vec<Citation>,
    },

    /// Stream completed; emitted exactly once per session
    Final {
        message: AssistantMessage,
    },

    /// Stream was cancelled before completion
    Cancelled {
        partial: String,
    },

    /// Transport failed mid-stream
    Failed {
        message: String,
        partial: String,
    },
}
