use serde_json::Value;

/// Prefix of event lines on the wire
pub const DEFAULT_EVENT_MARKER: &str = "data: ";

/// JSON body of one event line
///
/// The backend emits several unrelated shapes for the same information, so the
/// body stays an untyped document. Shape resolution lives with the components
/// that consume it (accumulator, citations, completion); this type only offers
/// defensive lookups that never panic on unexpected structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    value: Value,
}

impl Payload {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// `choices[0]`, if present
    pub fn first_choice(&self) -> Option<&Value> {
        self.value.get("choices")?.as_array()?.first()
    }

    /// Non-empty string at a JSON pointer
    pub fn text_at(&self, pointer: &str) -> Option<&str> {
        self.value
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }

    /// Array at a JSON pointer
    pub fn array_at(&self, pointer: &str) -> Option<&[Value]> {
        self.value
            .pointer(pointer)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Blank, or missing the event marker
    NotEvent,
    /// Event marker present but the body is not JSON
    Malformed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedLine {
    Payload(Payload),
    /// The configured end-of-stream sentinel (e.g. `[DONE]`)
    Sentinel,
    Skip(SkipReason),
}

/// Turns wire lines into payloads, skipping anything unparseable
#[derive(Debug, Clone)]
pub struct PayloadParser {
    event_marker: String,
    done_sentinel: Option<String>,
}

impl Default for PayloadParser {
    fn default() -> Self {
        Self {
            event_marker: DEFAULT_EVENT_MARKER.to_string(),
            done_sentinel: None,
        }
    }
}

impl PayloadParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_marker(mut self, marker: impl Into<String>) -> Self {
        self.event_marker = marker.into();
        self
    }

    pub fn with_done_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.done_sentinel = Some(sentinel.into());
        self
    }

    pub fn event_marker(&self) -> &str {
        &self.event_marker
    }

    pub fn parse(&self, line: &str) -> ParsedLine {
        let Some(data) = line.strip_prefix(self.event_marker.as_str()) else {
            return ParsedLine::Skip(SkipReason::NotEvent);
        };

        if self.is_done_marker(data) {
            return ParsedLine::Sentinel;
        }

        match serde_json::from_str::<Value>(data) {
            Ok(value) => ParsedLine::Payload(Payload::new(value)),
            Err(e) => {
                tracing::debug!("Skipping malformed event line: {}", e);
                ParsedLine::Skip(SkipReason::Malformed)
            }
        }
    }

    fn is_done_marker(&self, data: &str) -> bool {
        self.done_sentinel
            .as_deref()
            .map_or(false, |sentinel| data.trim() == sentinel)
    }
}
