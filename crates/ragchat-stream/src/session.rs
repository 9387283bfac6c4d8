use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ragchat_types::{AssistantMessage, Citation, SessionState};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::accumulator::MessageAccumulator;
use crate::citations::CitationAggregator;
use crate::completion::{CompletionDetector, TerminalSignal};
use crate::flight::SessionHandle;
use crate::frame_buffer::FrameBuffer;
use crate::observer::StreamObserver;
use crate::payload::{ParsedLine, PayloadParser};

/// How a completed session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A payload (or the sentinel line) carried a terminal signal
    Signalled(TerminalSignal),
    /// The transport closed before any terminal signal arrived
    Unsignalled,
}

/// Snapshot of a session, readable in every state
#[derive(Debug, Clone, Serialize)]
pub struct StreamOutcome {
    pub session_id: Uuid,
    pub state: SessionState,
    pub text: String,
    pub citations: Vec<Citation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<AssistantMessage>,
    pub unsignalled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
}

impl StreamOutcome {
    pub fn is_completed(&self) -> bool {
        self.state == SessionState::Completed
    }

    /// The final message, or whatever was accumulated if the stream never completed
    pub fn into_message(self) -> AssistantMessage {
        match self.message {
            Some(message) => message,
            None => AssistantMessage::new(self.text, self.citations),
        }
    }
}

/// One streamed response, from `start` to a terminal state
///
/// Fragments go through `FrameBuffer` -> `PayloadParser` ->
/// `MessageAccumulator` / `CitationAggregator` / `CompletionDetector`, and the
/// observer hears about every text change plus the final message. A session
/// can be restarted; `start` supersedes whatever was in flight.
pub struct StreamSession<O> {
    id: Uuid,
    state: SessionState,
    frames: FrameBuffer,
    parser: PayloadParser,
    accumulator: MessageAccumulator,
    citations: CitationAggregator,
    detector: CompletionDetector,
    cancel: CancellationToken,
    observer: O,
    final_message: Option<AssistantMessage>,
    termination: Option<Termination>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    started: Option<Instant>,
    elapsed: Option<Duration>,
}

impl<O: StreamObserver> StreamSession<O> {
    pub fn new(observer: O) -> Self {
        Self::with_parser(PayloadParser::default(), observer)
    }

    pub fn with_parser(parser: PayloadParser, observer: O) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            frames: FrameBuffer::with_capacity(4096),
            parser,
            accumulator: MessageAccumulator::new(),
            citations: CitationAggregator::new(),
            detector: CompletionDetector::new(),
            cancel: CancellationToken::new(),
            observer,
            final_message: None,
            termination: None,
            error: None,
            started_at: None,
            started: None,
            elapsed: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state, counting a cancellation signalled through a handle
    pub fn state(&self) -> SessionState {
        if self.state == SessionState::Active && self.cancel.is_cancelled() {
            SessionState::Cancelled
        } else {
            self.state
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    pub fn text(&self) -> &str {
        self.accumulator.text()
    }

    pub fn citations(&self) -> &[Citation] {
        self.citations.citations()
    }

    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle::new(self.id, self.cancel.clone())
    }

    pub(crate) fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Begin a fresh stream, cancelling the current one if it is still active
    pub fn start(&mut self) -> SessionHandle {
        if self.is_active() {
            tracing::info!("Stream session {} superseded by a new start", self.id);
            self.cancel();
        }

        self.id = Uuid::new_v4();
        self.cancel = CancellationToken::new();
        self.frames.clear();
        self.accumulator.reset();
        self.citations.reset();
        self.final_message = None;
        self.termination = None;
        self.error = None;
        self.started_at = Some(Utc::now());
        self.started = Some(Instant::now());
        self.elapsed = None;
        self.state = SessionState::Active;

        tracing::info!("Stream session {} started", self.id);
        self.handle()
    }

    /// Push one transport fragment through the pipeline
    ///
    /// Ignored unless the session is active. Lines after a terminal payload in
    /// the same fragment are discarded.
    pub fn feed(&mut self, fragment: impl AsRef<[u8]>) -> SessionState {
        if self.observe_cancellation() || self.state != SessionState::Active {
            tracing::trace!("Fragment ignored by {:?} session {}", self.state, self.id);
            return self.state;
        }

        for line in self.frames.append(fragment) {
            self.process_line(&line);
            if self.state != SessionState::Active {
                break;
            }
        }
        self.state
    }

    /// Transport reached end-of-stream
    ///
    /// Without a terminal signal this still completes the session with the
    /// partial text, after one parse attempt on the unterminated last line.
    pub fn finish(&mut self) -> SessionState {
        if self.observe_cancellation() || self.state != SessionState::Active {
            return self.state;
        }

        if let Some(line) = self.frames.take_remainder() {
            self.process_line(&line);
        }

        if self.state == SessionState::Active {
            tracing::warn!(
                "Stream session {} closed without a terminal signal, completing with {} bytes",
                self.id,
                self.accumulator.text().len()
            );
            self.complete(Termination::Unsignalled);
        }
        self.state
    }

    /// Stop the stream. No-op outside the active state.
    pub fn cancel(&mut self) {
        if self.state == SessionState::Active {
            self.cancel.cancel();
        }
        self.observe_cancellation();
    }

    /// Record a transport failure. Partial text and citations stay readable.
    pub fn fail(&mut self, error: impl fmt::Display) {
        if self.observe_cancellation() || self.state != SessionState::Active {
            return;
        }

        let message = error.to_string();
        tracing::error!("Stream session {} failed: {}", self.id, message);

        self.state = SessionState::Failed;
        self.mark_finished();
        self.observer.on_failed(&message, self.accumulator.text());
        self.error = Some(message);
    }

    pub fn outcome(&self) -> StreamOutcome {
        let elapsed = self
            .elapsed
            .or_else(|| self.started.map(|started| started.elapsed()))
            .unwrap_or_default();

        StreamOutcome {
            session_id: self.id,
            state: self.state(),
            text: self.accumulator.text().to_string(),
            citations: self.citations.citations().to_vec(),
            message: self.final_message.clone(),
            unsignalled: self.termination == Some(Termination::Unsignalled),
            error: self.error.clone(),
            started_at: self.started_at,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    fn process_line(&mut self, line: &str) {
        let payload = match self.parser.parse(line) {
            ParsedLine::Payload(payload) => payload,
            ParsedLine::Sentinel => {
                self.complete(Termination::Signalled(TerminalSignal::Sentinel));
                return;
            }
            ParsedLine::Skip(_) => return,
        };

        if self.accumulator.apply(&payload).is_changed() {
            self.observer.on_text(self.accumulator.text());
        }

        if self.citations.apply(&payload) {
            self.observer.on_citations(self.citations.citations());
        }

        if let Some(signal) = self.detector.detect(&payload) {
            self.complete(Termination::Signalled(signal));
        }
    }

    fn complete(&mut self, termination: Termination) {
        let message = AssistantMessage::new(
            self.accumulator.text(),
            self.citations.citations().to_vec(),
        );

        self.state = SessionState::Completed;
        self.termination = Some(termination);
        self.frames.clear();
        self.mark_finished();

        tracing::info!(
            "Stream session {} completed ({:?}, {} bytes, {} citations)",
            self.id,
            termination,
            message.content.len(),
            message.citations().len()
        );

        self.observer.on_final(&message);
        self.final_message = Some(message);
    }

    /// Move to Cancelled if the token fired while active. Returns true if it did.
    fn observe_cancellation(&mut self) -> bool {
        if self.state != SessionState::Active || !self.cancel.is_cancelled() {
            return false;
        }

        self.state = SessionState::Cancelled;
        self.frames.clear();
        self.mark_finished();

        tracing::info!(
            "Stream session {} cancelled with {} bytes accumulated",
            self.id,
            self.accumulator.text().len()
        );
        self.observer.on_cancelled(self.accumulator.text());
        true
    }

    fn mark_finished(&mut self) {
        self.elapsed = self.started.map(|started| started.elapsed());
    }
}

impl<O> fmt::Debug for StreamSession<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("text_len", &self.accumulator.text().len())
            .field("citations", &self.citations.citations().len())
            .finish()
    }
}
