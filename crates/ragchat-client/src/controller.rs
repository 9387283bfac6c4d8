use std::sync::Arc;

use ragchat_stream::{
    drive, PayloadParser, SessionState, SingleFlight, StreamError, StreamObserver, StreamOutcome,
    StreamSession,
};
use ragchat_types::ChatMessage;

use crate::error::{has_embedded_error, ClientError};
use crate::request::{GenerateOptions, GenerateRequest};
use crate::traits::GenerationClient;

/// One conversation with a generation server
///
/// Keeps the history that is replayed on every request and makes sure only
/// one answer streams at a time: starting a turn cancels the previous one,
/// and `flight()` lets other tasks (a Ctrl-C handler, a deadline) cancel the
/// turn in progress.
pub struct ChatController {
    client: Arc<dyn GenerationClient>,
    options: GenerateOptions,
    parser: PayloadParser,
    history: Vec<ChatMessage>,
    flight: Arc<SingleFlight>,
}

impl ChatController {
    pub fn new(client: Arc<dyn GenerationClient>, options: GenerateOptions) -> Self {
        Self {
            client,
            options,
            parser: PayloadParser::default(),
            history: Vec::new(),
            flight: Arc::new(SingleFlight::new()),
        }
    }

    pub fn with_parser(mut self, parser: PayloadParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut GenerateOptions {
        &mut self.options
    }

    pub fn flight(&self) -> Arc<SingleFlight> {
        Arc::clone(&self.flight)
    }

    /// Cancel whatever is streaming and forget the conversation
    pub fn reset(&mut self) {
        if self.flight.cancel_active() {
            tracing::info!("Cancelled active turn on reset");
        }
        self.history.clear();
    }

    /// Ask `question` and stream the answer into `observer`
    ///
    /// The user message always stays in history. The assistant answer is
    /// appended only when the turn completes with non-empty text that does
    /// not carry the server's error marker. Cancelled turns return `Ok` with
    /// a cancelled outcome.
    pub async fn send<O: StreamObserver>(
        &mut self,
        question: impl Into<String>,
        observer: O,
    ) -> Result<StreamOutcome, ClientError> {
        self.history.push(ChatMessage::user(question));
        let request = GenerateRequest::with_options(self.history.clone(), &self.options);

        let mut session = StreamSession::with_parser(self.parser.clone(), observer);
        let handle = session.start();
        self.flight.begin(handle.clone());

        let result = self.run_turn(&mut session, &request).await;
        self.flight.release(handle.session_id());
        let outcome = result?;

        if outcome.is_completed() {
            if has_embedded_error(&outcome.text) {
                tracing::warn!("Turn {} completed with an embedded server error", outcome.session_id);
                return Err(ClientError::EmbeddedServerError {
                    content: outcome.text,
                });
            }
            if !outcome.text.is_empty() {
                self.history.push(ChatMessage::assistant(outcome.text.clone()));
            }
        }

        Ok(outcome)
    }

    async fn run_turn<O: StreamObserver>(
        &self,
        session: &mut StreamSession<O>,
        request: &GenerateRequest,
    ) -> Result<StreamOutcome, ClientError> {
        let handle = session.handle();

        let response = tokio::select! {
            biased;
            _ = handle.cancelled() => {
                session.cancel();
                return Ok(session.outcome());
            }
            response = self.client.generate(request) => response,
        };

        let fragments = match response {
            Ok(fragments) => fragments,
            Err(e) => {
                session.fail(&e);
                return Err(e);
            }
        };

        match drive(session, fragments).await {
            Ok(outcome) => Ok(outcome),
            Err(StreamError::NotActive(SessionState::Cancelled)) => {
                session.cancel();
                Ok(session.outcome())
            }
            Err(e) => Err(e.into()),
        }
    }
}
