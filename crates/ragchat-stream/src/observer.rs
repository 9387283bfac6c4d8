use ragchat_types::{AssistantMessage, Citation, StreamEvent};
use tokio::sync::mpsc;

/// Receives session progress as it happens
///
/// Callbacks run synchronously inside `StreamSession::feed`, in payload order.
/// `on_text` fires only for payloads that changed the text, and `on_final`
/// fires at most once per session, on completion.
pub trait StreamObserver: Send {
    /// Full accumulated text after a text-changing payload
    fn on_text(&mut self, text: &str);

    fn on_final(&mut self, message: &AssistantMessage);

    fn on_citations(&mut self, _citations: &[Citation]) {}

    fn on_cancelled(&mut self, _partial: &str) {}

    fn on_failed(&mut self, _error: &str, _partial: &str) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl StreamObserver for NoopObserver {
    fn on_text(&mut self, _text: &str) {}

    fn on_final(&mut self, _message: &AssistantMessage) {}
}

/// Observer built from a pair of closures
pub struct FnObserver<T, F> {
    on_text: T,
    on_final: F,
}

impl<T, F> FnObserver<T, F>
where
    T: FnMut(&str) + Send,
    F: FnMut(&AssistantMessage) + Send,
{
    pub fn new(on_text: T, on_final: F) -> Self {
        Self { on_text, on_final }
    }
}

impl<T, F> StreamObserver for FnObserver<T, F>
where
    T: FnMut(&str) + Send,
    F: FnMut(&AssistantMessage) + Send,
{
    fn on_text(&mut self, text: &str) {
        (self.on_text)(text)
    }

    fn on_final(&mut self, message: &AssistantMessage) {
        (self.on_final)(message)
    }
}

/// Forwards every callback as a `StreamEvent` over an unbounded channel
///
/// A dropped receiver is not an error: the session keeps accumulating and the
/// events are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StreamEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<StreamEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("Stream event receiver dropped");
        }
    }
}

impl StreamObserver for ChannelObserver {
    fn on_text(&mut self, text: &str) {
        self.send(StreamEvent::Text {
            content: text.to_string(),
        });
    }

    fn on_final(&mut self, message: &AssistantMessage) {
        self.send(StreamEvent::Final {
            message: message.clone(),
        });
    }

    fn on_citations(&mut self, citations: &[Citation]) {
        self.send(StreamEvent::Citations {
            citations: citations.to_vec(),
        });
    }

    fn on_cancelled(&mut self, partial: &str) {
        self.send(StreamEvent::Cancelled {
            partial: partial.to_string(),
        });
    }

    fn on_failed(&mut self, error: &str, partial: &str) {
        self.send(StreamEvent::Failed {
            message: error.to_string(),
            partial: partial.to_string(),
        });
    }
}

impl<O: StreamObserver + ?Sized> StreamObserver for Box<O> {
    fn on_text(&mut self, text: &str) {
        (**self).on_text(text)
    }

    fn on_final(&mut self, message: &AssistantMessage) {
        (**self).on_final(message)
    }

    fn on_citations(&mut self, citations: &[Citation]) {
        (**self).on_citations(citations)
    }

    fn on_cancelled(&mut self, partial: &str) {
        (**self).on_cancelled(partial)
    }

    fn on_failed(&mut self, error: &str, partial: &str) {
        (**self).on_failed(error, partial)
    }
}
