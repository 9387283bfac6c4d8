use std::sync::{Mutex, PoisonError};

use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Cancellation handle for one stream session
///
/// Cheap to clone; hand one to whatever needs to stop the stream (a stop
/// button, a deadline timer). Cancelling is idempotent.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    token: CancellationToken,
}

impl SessionHandle {
    pub(crate) fn new(session_id: Uuid, token: CancellationToken) -> Self {
        Self { session_id, token }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the session has been cancelled
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// Tracks the one active session of a chat client
///
/// Beginning a session cancels the one it supersedes, so two streams never
/// race to update the same conversation view.
#[derive(Debug, Default)]
pub struct SingleFlight {
    active: Mutex<Option<SessionHandle>>,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` as the active session, cancelling its predecessor
    pub fn begin(&self, handle: SessionHandle) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = active.as_ref() {
            if previous.session_id != handle.session_id {
                tracing::info!("Superseding stream session {}", previous.session_id);
                previous.cancel();
            }
        }
        *active = Some(handle);
    }

    /// Cancel the active session, if any. Returns whether one was cancelled.
    pub fn cancel_active(&self) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        match active.as_ref() {
            Some(handle) if !handle.is_cancelled() => {
                handle.cancel();
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<SessionHandle> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Forget `session_id` if it is still the active one
    pub fn release(&self, session_id: Uuid) {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        if active.as_ref().map_or(false, |h| h.session_id == session_id) {
            *active = None;
        }
    }
}
