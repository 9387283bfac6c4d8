use crate::payload::Payload;

const STOP: &str = "stop";

/// Which field signalled the end of the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalSignal {
    /// `choices[0].finish_reason == "stop"`
    ChoiceFinishReason,
    /// top-level `finish_reason == "stop"`
    FinishReason,
    /// `done == true`
    Done,
    /// the parser's configured done-sentinel line
    Sentinel,
}

/// Recognizes the terminal payload of a stream
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionDetector;

impl CompletionDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn detect(&self, payload: &Payload) -> Option<TerminalSignal> {
        let value = payload.as_value();

        if payload.text_at("/choices/0/finish_reason") == Some(STOP) {
            Some(TerminalSignal::ChoiceFinishReason)
        } else if value.get("finish_reason").and_then(|v| v.as_str()) == Some(STOP) {
            Some(TerminalSignal::FinishReason)
        } else if value.get("done").and_then(|v| v.as_bool()) == Some(true) {
            Some(TerminalSignal::Done)
        } else {
            None
        }
    }

    pub fn is_terminal(&self, payload: &Payload) -> bool {
        self.detect(payload).is_some()
    }
}
