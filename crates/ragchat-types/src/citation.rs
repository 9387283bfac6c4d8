use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_CONTENT_TYPE: &str = "text";
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// A source passage backing part of a generated answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub source_text: String,
    pub source_name: String,
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

fn default_content_type() -> String {
    DEFAULT_CONTENT_TYPE.to_string()
}

impl Citation {
    pub fn new(source_text: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            source_name: source_name.into(),
            content_type: default_content_type(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Build a citation from one entry of a backend citation array.
    ///
    /// The backend is inconsistent about field names, so each field falls back:
    /// - text: `content`, then `text`, then empty
    /// - name: `document_name`, then `source`, then "Unknown source"
    /// - type: `document_type`, then "text"
    ///
    /// Returns `None` when the entry is not a JSON object.
    pub fn from_source_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| obj.get(*key).and_then(Value::as_str))
                .find(|s| !s.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            source_text: field(&["content", "text"]).unwrap_or_default(),
            source_name: field(&["document_name", "source"])
                .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            content_type: field(&["document_type"]).unwrap_or_else(default_content_type),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_results_entry() {
        let citation = Citation::from_source_value(&json!({
            "content": "Rust has no GC.",
            "document_name": "syllabus.pdf",
            "document_type": "pdf",
        }))
        .unwrap();

        assert_eq!(citation.source_text, "Rust has no GC.");
        assert_eq!(citation.source_name, "syllabus.pdf");
        assert_eq!(citation.content_type, "pdf");
    }

    #[test]
    fn test_fallback_fields() {
        let citation = Citation::from_source_value(&json!({
            "text": "alt text",
            "source": "notes.md",
        }))
        .unwrap();

        assert_eq!(citation.source_text, "alt text");
        assert_eq!(citation.source_name, "notes.md");
        assert_eq!(citation.content_type, "text");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let citation = Citation::from_source_value(&json!({})).unwrap();

        assert_eq!(citation.source_text, "");
        assert_eq!(citation.source_name, UNKNOWN_SOURCE);
        assert_eq!(citation.content_type, DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(Citation::from_source_value(&json!("just a string")).is_none());
        assert!(Citation::from_source_value(&json!(42)).is_none());
    }
}
