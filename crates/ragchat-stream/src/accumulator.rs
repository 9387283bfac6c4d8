use crate::payload::Payload;

/// Where a payload carries answer text, in resolution order
///
/// The backend switches delivery discipline depending on its code path, so
/// the shape decides how the text is folded in rather than a fixed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentShape<'a> {
    /// `choices[0].delta.content`: incremental, appended verbatim
    Delta(&'a str),
    /// `choices[0].message.content`: cumulative; only text not already held is appended
    Cumulative(&'a str),
    /// top-level `content`: full snapshot, replaces the text
    Snapshot(&'a str),
}

impl<'a> ContentShape<'a> {
    /// First non-empty content field wins: delta, then message, then flat
    pub fn resolve(payload: &'a Payload) -> Option<Self> {
        if let Some(text) = payload.text_at("/choices/0/delta/content") {
            return Some(Self::Delta(text));
        }
        if let Some(text) = payload.text_at("/choices/0/message/content") {
            return Some(Self::Cumulative(text));
        }
        payload.text_at("/content").map(Self::Snapshot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextChange {
    Unchanged,
    Appended,
    Replaced,
}

impl TextChange {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Folds payloads into the growing answer text
#[derive(Debug, Default)]
pub struct MessageAccumulator {
    text: String,
}

impl MessageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, payload: &Payload) -> TextChange {
        match ContentShape::resolve(payload) {
            Some(ContentShape::Delta(delta)) => {
                self.text.push_str(delta);
                TextChange::Appended
            }
            Some(ContentShape::Cumulative(content)) => self.apply_cumulative(content),
            Some(ContentShape::Snapshot(snapshot)) => {
                if snapshot == self.text {
                    return TextChange::Unchanged;
                }
                if snapshot.len() < self.text.len() {
                    tracing::warn!(
                        "Snapshot payload shrinks accumulated text ({} -> {} bytes)",
                        self.text.len(),
                        snapshot.len()
                    );
                }
                self.text.clear();
                self.text.push_str(snapshot);
                TextChange::Replaced
            }
            None => TextChange::Unchanged,
        }
    }

    /// Full content that extends the text contributes only its new tail.
    ///
    /// Heuristic otherwise: a resent suffix is dropped, and a short token that
    /// repeats legitimately (e.g. "a" after "...a") is dropped too.
    fn apply_cumulative(&mut self, content: &str) -> TextChange {
        if let Some(tail) = content.strip_prefix(self.text.as_str()) {
            if tail.is_empty() {
                return TextChange::Unchanged;
            }
            self.text.push_str(tail);
            return TextChange::Appended;
        }

        if self.text.ends_with(content) {
            return TextChange::Unchanged;
        }
        self.text.push_str(content);
        TextChange::Appended
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    pub fn reset(&mut self) {
        self.text.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn delta(text: &str) -> Payload {
        Payload::new(json!({"choices": [{"delta": {"content": text}}]}))
    }

    fn message(text: &str) -> Payload {
        Payload::new(json!({"choices": [{"message": {"content": text}}]}))
    }

    fn snapshot(text: &str) -> Payload {
        Payload::new(json!({"content": text}))
    }

    #[test]
    fn test_delta_appends() {
        let mut acc = MessageAccumulator::new();

        assert_eq!(acc.apply(&delta("Hello")), TextChange::Appended);
        assert_eq!(acc.apply(&delta(" world")), TextChange::Appended);
        assert_eq!(acc.text(), "Hello world");
    }

    #[test]
    fn test_cumulative_appends_new_content() {
        let mut acc = MessageAccumulator::new();

        acc.apply(&message("Hi"));
        acc.apply(&message(" there"));
        assert_eq!(acc.text(), "Hi there");
    }

    #[test]
    fn test_cumulative_full_content_extends_text() {
        let mut acc = MessageAccumulator::new();

        assert_eq!(acc.apply(&message("Hi")), TextChange::Appended);
        assert_eq!(acc.apply(&message("Hi there")), TextChange::Appended);
        assert_eq!(acc.text(), "Hi there");

        assert_eq!(acc.apply(&message("Hi there!")), TextChange::Appended);
        assert_eq!(acc.text(), "Hi there!");
    }

    #[test]
    fn test_cumulative_skips_resent_suffix() {
        let mut acc = MessageAccumulator::new();

        acc.apply(&message("Hi there"));
        assert_eq!(acc.apply(&message("there")), TextChange::Unchanged);
        assert_eq!(acc.apply(&message("Hi there")), TextChange::Unchanged);
        assert_eq!(acc.text(), "Hi there");
    }

    #[test]
    fn test_cumulative_drops_repeated_short_token() {
        let mut acc = MessageAccumulator::new();

        acc.apply(&message("ha"));
        assert_eq!(acc.apply(&message("ha")), TextChange::Unchanged);
        assert_eq!(acc.text(), "ha");
    }

    #[test]
    fn test_snapshot_replaces_and_is_idempotent() {
        let mut acc = MessageAccumulator::new();

        assert_eq!(acc.apply(&snapshot("Draft")), TextChange::Replaced);
        assert_eq!(acc.apply(&snapshot("Draft answer")), TextChange::Replaced);
        assert_eq!(acc.apply(&snapshot("Draft answer")), TextChange::Unchanged);
        assert_eq!(acc.text(), "Draft answer");
    }

    #[test]
    fn test_delta_wins_over_other_shapes() {
        let mut acc = MessageAccumulator::new();
        let payload = Payload::new(json!({
            "choices": [{"delta": {"content": "d"}, "message": {"content": "m"}}],
            "content": "c",
        }));

        acc.apply(&payload);
        assert_eq!(acc.text(), "d");
    }

    #[test]
    fn test_empty_delta_falls_through() {
        let mut acc = MessageAccumulator::new();
        let payload = Payload::new(json!({
            "choices": [{"delta": {"content": ""}, "message": {"content": "m"}}],
        }));

        assert_eq!(ContentShape::resolve(&payload), Some(ContentShape::Cumulative("m")));
        acc.apply(&payload);
        assert_eq!(acc.text(), "m");
    }

    #[test]
    fn test_no_content_is_unchanged() {
        let mut acc = MessageAccumulator::new();
        acc.apply(&delta("keep"));

        let change = acc.apply(&Payload::new(json!({"choices": [{"finish_reason": "stop"}]})));
        assert!(!change.is_changed());
        assert_eq!(acc.text(), "keep");
    }

    #[test]
    fn test_reset() {
        let mut acc = MessageAccumulator::new();
        acc.apply(&delta("old"));

        acc.reset();
        assert_eq!(acc.text(), "");
        assert_eq!(acc.into_text(), "");
    }
}
