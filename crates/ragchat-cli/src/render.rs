use std::io::{self, Stdout, Write};

use ragchat_stream::{AssistantMessage, Citation, StreamObserver};

/// Prints a streamed answer as it grows
///
/// The session reports the whole accumulated text on every change; only the
/// unseen suffix is written. If a snapshot rewrites text that was already
/// printed, the answer is reprinted on a fresh line.
pub struct TerminalObserver<W = Stdout> {
    out: W,
    printed: String,
}

impl TerminalObserver<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalObserver<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: String::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::debug!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write + Send> StreamObserver for TerminalObserver<W> {
    fn on_text(&mut self, text: &str) {
        match text.strip_prefix(self.printed.as_str()) {
            Some(suffix) => self.write(suffix),
            None => {
                let whole = format!("\n{}", text);
                self.write(&whole);
            }
        }
        self.printed = text.to_string();
    }

    fn on_final(&mut self, message: &AssistantMessage) {
        let mut tail = String::from("\n");
        tail.push_str(&format_citations(message.citations()));
        self.write(&tail);
    }

    fn on_cancelled(&mut self, _partial: &str) {
        self.write("\n[cancelled]\n");
    }
}

/// Numbered source list printed under an answer; empty when there are none
pub fn format_citations(citations: &[Citation]) -> String {
    if citations.is_empty() {
        return String::new();
    }

    let mut out = String::from("\nSources:\n");
    for (i, citation) in citations.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {} ({})\n",
            i + 1,
            citation.source_name,
            citation.content_type
        ));
    }
    out
}
