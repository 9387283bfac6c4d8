use futures::{Stream, StreamExt};
use ragchat_types::SessionState;

use crate::error::{BoxError, Result, StreamError};
use crate::observer::StreamObserver;
use crate::session::{StreamOutcome, StreamSession};

/// Pull fragments from `fragments` into an already started session
///
/// Each read is raced against the session's cancellation token, so a cancel
/// from any `SessionHandle` abandons the pending read and returns the partial
/// outcome. End of stream completes the session (see `StreamSession::finish`).
/// A source error that is not caused by cancellation fails the session and is
/// returned; the partial text remains readable on the session.
pub async fn drive<O, S, B, E>(session: &mut StreamSession<O>, fragments: S) -> Result<StreamOutcome>
where
    O: StreamObserver,
    S: Stream<Item = std::result::Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<BoxError>,
{
    let state = session.state();
    if state != SessionState::Active {
        return Err(StreamError::NotActive(state));
    }

    let token = session.cancellation_token();
    futures::pin_mut!(fragments);

    while session.state() == SessionState::Active {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => {
                session.cancel();
                break;
            }
            next = fragments.next() => next,
        };

        match next {
            Some(Ok(fragment)) => {
                session.feed(fragment);
            }
            Some(Err(e)) => {
                if token.is_cancelled() {
                    session.cancel();
                    break;
                }
                let error = StreamError::transport(e);
                session.fail(&error);
                return Err(error);
            }
            None => {
                session.finish();
            }
        }
    }

    Ok(session.outcome())
}
