use futures::Stream;
use ragchat_stream::{
    drive, ChannelObserver, PayloadParser, SessionHandle, SessionState, StreamEvent,
    StreamSession,
};

use crate::request::GenerateRequest;
use crate::traits::GenerationClient;

/// Run one generation and yield its progress as `StreamEvent`s
///
/// The returned handle cancels the generation, whether it is still waiting
/// for the response head or reading the body; the stream then ends with
/// `Cancelled`. Otherwise the last event is `Final` or `Failed`. Dropping the
/// stream early abandons the request.
pub fn event_stream<'a, C>(
    client: &'a C,
    request: GenerateRequest,
    parser: PayloadParser,
) -> (SessionHandle, impl Stream<Item = StreamEvent> + Send + 'a)
where
    C: GenerationClient + ?Sized,
{
    let (observer, mut events) = ChannelObserver::channel();
    let mut session = StreamSession::with_parser(parser, observer);
    let handle = session.start();
    let cancel = handle.clone();

    let stream = async_stream::stream! {
        let fragments = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            response = client.generate(&request) => match response {
                Ok(fragments) => Some(fragments),
                Err(e) => {
                    session.fail(&e);
                    None
                }
            },
        };

        if let Some(fragments) = fragments {
            let run = drive(&mut session, fragments);
            futures::pin_mut!(run);

            loop {
                let next = tokio::select! {
                    biased;
                    event = events.recv() => event,
                    result = &mut run => {
                        if let Err(e) = result {
                            tracing::debug!("Event stream ended with error: {}", e);
                        }
                        None
                    }
                };

                match next {
                    Some(event) => yield event,
                    None => break,
                }
            }
        }

        // A cancel that landed before the body was read is observed here
        if session.state() == SessionState::Cancelled {
            session.cancel();
        }

        while let Ok(event) = events.try_recv() {
            yield event;
        }
    };

    (handle, stream)
}
