use ragchat_types::SessionState;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StreamError {
    /// The fragment source failed for a reason other than cancellation
    #[error("Stream transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("Session is not active (state: {0:?})")]
    NotActive(SessionState),
}

impl StreamError {
    pub fn transport(error: impl Into<BoxError>) -> Self {
        Self::Transport(error.into())
    }
}

pub type Result<T> = std::result::Result<T, StreamError>;
