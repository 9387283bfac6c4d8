use std::sync::{Arc, Mutex};

use ragchat_stream::{
    AssistantMessage, Citation, FrameBuffer, SessionState, StreamObserver, StreamSession,
    TerminalSignal, Termination,
};

#[derive(Default)]
struct Recorded {
    texts: Vec<String>,
    finals: Vec<AssistantMessage>,
    citations: Vec<Vec<Citation>>,
    cancelled: Vec<String>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Recorded>>);

impl Recorder {
    fn texts(&self) -> Vec<String> {
        self.0.lock().unwrap().texts.clone()
    }

    fn finals(&self) -> Vec<AssistantMessage> {
        self.0.lock().unwrap().finals.clone()
    }

    fn citation_updates(&self) -> usize {
        self.0.lock().unwrap().citations.len()
    }

    fn cancelled(&self) -> Vec<String> {
        self.0.lock().unwrap().cancelled.clone()
    }
}

impl StreamObserver for Recorder {
    fn on_text(&mut self, text: &str) {
        self.0.lock().unwrap().texts.push(text.to_string());
    }

    fn on_final(&mut self, message: &AssistantMessage) {
        self.0.lock().unwrap().finals.push(message.clone());
    }

    fn on_citations(&mut self, citations: &[Citation]) {
        self.0.lock().unwrap().citations.push(citations.to_vec());
    }

    fn on_cancelled(&mut self, partial: &str) {
        self.0.lock().unwrap().cancelled.push(partial.to_string());
    }
}

fn started() -> (StreamSession<Recorder>, Recorder) {
    let recorder = Recorder::default();
    let mut session = StreamSession::new(recorder.clone());
    session.start();
    (session, recorder)
}

fn delta(text: &str) -> String {
    format!("data: {}\n", serde_json::json!({"choices": [{"delta": {"content": text}}]}))
}

const STOP: &str = "data: {\"choices\":[{\"finish_reason\":\"stop\"}]}\n";

#[test]
fn test_end_to_end_scenario() {
    let (mut session, recorder) = started();

    session.feed("data: {\"choices\":[{\"delta\":{\"content\":\"A\"}}]}\n");
    session.feed("data: {\"choices\":[{\"delta\":{\"content\":\"B\"}}]}\n");
    let state = session.feed(STOP);

    assert_eq!(state, SessionState::Completed);
    assert_eq!(recorder.texts(), vec!["A", "AB"]);

    let finals = recorder.finals();
    assert_eq!(finals.len(), 1);
    assert_eq!(
        serde_json::to_value(&finals[0]).unwrap(),
        serde_json::json!({"role": "assistant", "content": "AB"})
    );
    assert_eq!(
        session.termination(),
        Some(Termination::Signalled(TerminalSignal::ChoiceFinishReason))
    );
}

#[test]
fn test_idle_session_ignores_fragments() {
    let recorder = Recorder::default();
    let mut session = StreamSession::new(recorder.clone());

    assert_eq!(session.feed(delta("x")), SessionState::Idle);
    assert_eq!(session.text(), "");
    assert!(recorder.texts().is_empty());
}

#[test]
fn test_fragmentation_invariance_end_to_end() {
    let wire = format!("{}{}{}", delta("Hel"), delta("lo"), STOP);

    for chunk_size in 1..wire.len() {
        let (mut session, recorder) = started();
        for chunk in wire.as_bytes().chunks(chunk_size) {
            session.feed(chunk);
        }

        assert_eq!(session.state(), SessionState::Completed, "chunk size {}", chunk_size);
        assert_eq!(session.text(), "Hello");
        assert_eq!(recorder.texts(), vec!["Hel", "Hello"]);
    }
}

#[test]
fn test_frame_buffer_fragmentation_matches_single_append() {
    let wire = format!("{}: comment\n\n{}{}", delta("α"), delta("β"), STOP);
    let whole = FrameBuffer::new().append(&wire);

    for offset in 0..=wire.len() {
        for second in offset..=wire.len() {
            let mut buffer = FrameBuffer::new();
            let bytes = wire.as_bytes();
            let mut lines = buffer.append(&bytes[..offset]);
            lines.extend(buffer.append(&bytes[offset..second]));
            lines.extend(buffer.append(&bytes[second..]));
            assert_eq!(lines, whole);
        }
    }
}

#[test]
fn test_cumulative_full_content_is_not_duplicated() {
    let (mut session, recorder) = started();

    session.feed("data: {\"choices\":[{\"message\":{\"content\":\"Hi\"}}]}\n");
    session.feed("data: {\"choices\":[{\"message\":{\"content\":\"Hi there\"}}]}\n");

    assert_eq!(session.text(), "Hi there");
    assert_eq!(recorder.texts(), vec!["Hi", "Hi there"]);
}

#[test]
fn test_cumulative_dedupe() {
    let (mut session, _) = started();

    session.feed("data: {\"choices\":[{\"message\":{\"content\":\"Hi\"}}]}\n");
    session.feed("data: {\"choices\":[{\"message\":{\"content\":\" there\"}}]}\n");
    session.feed("data: {\"choices\":[{\"message\":{\"content\":\"there\"}}]}\n");

    assert_eq!(session.text(), "Hi there");
}

#[test]
fn test_replacement_idempotence() {
    let (mut session, recorder) = started();

    session.feed("data: {\"content\":\"Full answer\"}\n");
    session.feed("data: {\"content\":\"Full answer\"}\n");

    assert_eq!(session.text(), "Full answer");
    assert_eq!(recorder.texts().len(), 1);
}

#[test]
fn test_citation_replace_semantics() {
    let (mut session, recorder) = started();

    session.feed(
        "data: {\"citations\":{\"results\":[{\"content\":\"c1\",\"document_name\":\"a.pdf\"},{\"content\":\"c2\",\"document_name\":\"b.pdf\"}]}}\n",
    );
    session.feed("data: {\"citations\":[]}\n");
    assert_eq!(session.citations().len(), 2);

    session.feed("data: {\"citations\":[{\"content\":\"c3\",\"document_name\":\"c.pdf\"}]}\n");
    assert_eq!(session.citations().len(), 1);
    assert_eq!(session.citations()[0].source_name, "c.pdf");

    session.feed("data: {\"done\":true}\n");

    let finals = recorder.finals();
    assert_eq!(finals[0].citations().len(), 1);
    assert_eq!(recorder.citation_updates(), 2);
}

#[test]
fn test_citation_only_payload_does_not_fire_text_callback() {
    let (mut session, recorder) = started();

    session.feed(delta("text"));
    session.feed("data: {\"citations\":[{\"content\":\"c\"}]}\n");

    assert_eq!(recorder.texts(), vec!["text"]);
}

#[test]
fn test_termination_fires_once() {
    let (mut session, recorder) = started();

    session.feed(format!("{}{}{}", delta("done"), STOP, delta(" extra")));
    session.feed(delta("more"));
    session.feed(STOP);
    session.finish();

    assert_eq!(recorder.finals().len(), 1);
    assert_eq!(session.text(), "done");
}

#[test]
fn test_cancellation_freezes_state() {
    let (mut session, recorder) = started();

    session.feed(delta("partial"));
    session.cancel();
    let state = session.feed(delta(" ignored"));

    assert_eq!(state, SessionState::Cancelled);
    assert_eq!(session.text(), "partial");
    assert_eq!(recorder.texts(), vec!["partial"]);
    assert!(recorder.finals().is_empty());
    assert_eq!(recorder.cancelled(), vec!["partial"]);

    session.cancel();
    assert_eq!(recorder.cancelled().len(), 1);
}

#[test]
fn test_cancel_through_handle_is_observed_on_next_feed() {
    let (mut session, recorder) = started();
    let handle = session.handle();

    session.feed(delta("a"));
    handle.cancel();

    assert_eq!(session.state(), SessionState::Cancelled);
    session.feed(delta("b"));

    assert_eq!(session.text(), "a");
    assert!(recorder.finals().is_empty());
    assert_eq!(session.outcome().state, SessionState::Cancelled);
}

#[test]
fn test_malformed_line_tolerance() {
    let (mut session, recorder) = started();

    session.feed(delta("first"));
    session.feed("data: {not json\n");
    session.feed(delta(" second"));
    session.feed(STOP);

    assert_eq!(session.state(), SessionState::Completed);
    assert_eq!(recorder.finals()[0].content, "first second");
}

#[test]
fn test_unsignalled_close_is_degraded_success() {
    let (mut session, recorder) = started();

    session.feed(delta("half"));
    let state = session.finish();

    assert_eq!(state, SessionState::Completed);
    assert_eq!(session.termination(), Some(Termination::Unsignalled));
    assert_eq!(recorder.finals()[0].content, "half");
    assert!(session.outcome().unsignalled);
}

#[test]
fn test_finish_parses_unterminated_last_line() {
    let (mut session, recorder) = started();

    session.feed(delta("x"));
    session.feed("data: {\"done\":true}");
    assert_eq!(session.state(), SessionState::Active);

    session.finish();
    assert_eq!(
        session.termination(),
        Some(Termination::Signalled(TerminalSignal::Done))
    );
    assert_eq!(recorder.finals().len(), 1);
}

#[test]
fn test_fail_preserves_partial_state() {
    let (mut session, recorder) = started();

    session.feed(delta("so far"));
    session.fail("connection reset");

    let outcome = session.outcome();
    assert_eq!(outcome.state, SessionState::Failed);
    assert_eq!(outcome.text, "so far");
    assert_eq!(outcome.error.as_deref(), Some("connection reset"));
    assert!(outcome.message.is_none());
    assert!(recorder.finals().is_empty());

    session.feed(delta(" more"));
    assert_eq!(session.text(), "so far");
}

#[test]
fn test_restart_supersedes_active_stream() {
    let (mut session, recorder) = started();
    let first = session.handle();
    session.feed(delta("old"));

    let second = session.start();

    assert!(first.is_cancelled());
    assert!(!second.is_cancelled());
    assert_ne!(first.session_id(), second.session_id());
    assert_eq!(session.state(), SessionState::Active);
    assert_eq!(session.text(), "");

    session.feed(delta("new"));
    session.feed(STOP);
    assert_eq!(recorder.finals()[0].content, "new");
    assert_eq!(recorder.cancelled(), vec!["old"]);
}

#[test]
fn test_restart_after_completion() {
    let (mut session, recorder) = started();
    session.feed(format!("{}{}", delta("one"), STOP));

    session.start();
    session.feed(format!("{}{}", delta("two"), STOP));

    let finals = recorder.finals();
    assert_eq!(finals.len(), 2);
    assert_eq!(finals[1].content, "two");
    assert!(recorder.cancelled().is_empty());
}

#[test]
fn test_outcome_into_message() {
    let (mut session, _) = started();
    session.feed(delta("partial"));
    session.cancel();

    let message = session.outcome().into_message();
    assert_eq!(message.content, "partial");
    assert!(message.citations.is_none());
}
