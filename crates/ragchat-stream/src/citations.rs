use ragchat_types::Citation;
use serde_json::Value;

use crate::payload::Payload;

/// Location of a citation array inside a payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CitationShape<'a> {
    /// `citations.results[]`
    Results(&'a [Value]),
    /// `citations[]`
    Flat(&'a [Value]),
    /// `choices[0].message.citations[]`
    Message(&'a [Value]),
}

impl<'a> CitationShape<'a> {
    /// Candidate shapes present in the payload, in checking order
    pub fn candidates(payload: &'a Payload) -> impl Iterator<Item = CitationShape<'a>> {
        [
            payload.array_at("/citations/results").map(Self::Results),
            payload.array_at("/citations").map(Self::Flat),
            payload.array_at("/choices/0/message/citations").map(Self::Message),
        ]
        .into_iter()
        .flatten()
    }

    pub fn entries(&self) -> &'a [Value] {
        match *self {
            Self::Results(entries) | Self::Flat(entries) | Self::Message(entries) => entries,
        }
    }

    pub fn to_citations(&self) -> Vec<Citation> {
        self.entries()
            .iter()
            .filter_map(Citation::from_source_value)
            .collect()
    }
}

/// Keeps the latest non-empty citation list of a stream
#[derive(Debug, Default)]
pub struct CitationAggregator {
    citations: Vec<Citation>,
}

impl CitationAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the list with the first non-empty shape; returns whether it did
    pub fn apply(&mut self, payload: &Payload) -> bool {
        let found = CitationShape::candidates(payload)
            .map(|shape| shape.to_citations())
            .find(|citations| !citations.is_empty());

        match found {
            Some(citations) => {
                self.citations = citations;
                true
            }
            None => false,
        }
    }

    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    pub fn into_citations(self) -> Vec<Citation> {
        self.citations
    }

    pub fn reset(&mut self) {
        self.citations.clear();
    }
}
