use ragchat_stream::StreamError;
use serde::Serialize;
use thiserror::Error;

/// Text the generation server puts into an answer when the pipeline failed behind it
pub const EMBEDDED_ERROR_MARKER: &str = "Error from rag server";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid client configuration: {0}")]
    Configuration(String),

    #[error("Failed to reach RAG server: {0}")]
    Request(#[from] reqwest::Error),

    #[error("RAG server returned {status}: {body}")]
    Http { status: u16, body: String },

    /// A completed answer that carries the server's error marker
    #[error("RAG server reported an error inside its answer")]
    EmbeddedServerError { content: String },

    #[error(transparent)]
    Stream(#[from] StreamError),
}

/// Coarse failure categories for user-facing messaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Server overloaded, out of resources or unavailable
    ServerResource,
    /// The server accepted the request but could not produce an answer
    Inference,
    /// Connection dropped or never established
    Transport,
    /// Bad URL, unknown endpoint, or an invalid local setting
    Configuration,
}

impl FailureKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ServerResource => {
                "The RAG server is busy or out of resources. Please try again in a moment."
            }
            Self::Inference => {
                "Sorry, I encountered an error processing your request. Please try again."
            }
            Self::Transport => {
                "Lost the connection to the RAG server. Check that it is running and try again."
            }
            Self::Configuration => {
                "The chat client is misconfigured. Check the server URL and settings."
            }
        }
    }
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Configuration(_) => FailureKind::Configuration,
            Self::Request(e) if e.is_builder() => FailureKind::Configuration,
            Self::Request(_) => FailureKind::Transport,
            Self::Http { status, .. } => classify_status(*status),
            Self::EmbeddedServerError { .. } => FailureKind::Inference,
            Self::Stream(_) => FailureKind::Transport,
        }
    }

    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}

fn classify_status(status: u16) -> FailureKind {
    match status {
        429 | 500..=599 => FailureKind::ServerResource,
        401 | 403 | 404 | 405 => FailureKind::Configuration,
        _ => FailureKind::Inference,
    }
}

pub fn has_embedded_error(text: &str) -> bool {
    text.contains(EMBEDDED_ERROR_MARKER)
}
