//! Affective memory records and the open feeling-tag domain.

use crate::id::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A feeling tag.
///
/// The domain is open: any string is a valid feeling. The associated
/// constants name the feelings the rest of the crate knows how to use.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feeling(String);

impl Feeling {
    pub const CALM: &'static str = "calm";
    pub const JOY: &'static str = "joy";
    pub const CURIOSITY: &'static str = "curiosity";
    pub const SADNESS: &'static str = "sadness";
    pub const AWE: &'static str = "awe";
    pub const ANGER: &'static str = "anger";
    pub const FEAR: &'static str = "fear";
    pub const COMPASSION: &'static str = "compassion";

    /// Wrap any tag. No validation is applied.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The raw tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Feeling {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Feeling {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl PartialEq<str> for Feeling {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One remembered experience charged with a feeling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffectiveMemoryRecord {
    /// Unique identifier.
    pub id: RecordId,
    /// When the experience was stored (UTC).
    pub timestamp: DateTime<Utc>,
    /// Feeling tag, compared by exact, case-sensitive equality.
    pub feeling: Feeling,
    /// Opaque embedding vector; the store assigns it no meaning.
    pub embedding: Vec<f32>,
    /// Narrative trace.
    pub trace: String,
}

impl AffectiveMemoryRecord {
    pub(crate) fn new(embedding: Vec<f32>, feeling: Feeling, trace: String) -> Self {
        Self {
            id: RecordId::new(),
            timestamp: Utc::now(),
            feeling,
            embedding,
            trace,
        }
    }

    /// First `max_chars` characters of the trace, for log lines.
    pub fn trace_preview(&self, max_chars: usize) -> String {
        preview(&self.trace, max_chars)
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feeling_is_open() {
        let feeling = Feeling::new("saudade");
        assert_eq!(feeling.as_str(), "saudade");
        assert!(feeling == *"saudade");
        assert_ne!(Feeling::from("Joy"), Feeling::from(Feeling::JOY));
    }

    #[test]
    fn test_trace_preview() {
        let record = AffectiveMemoryRecord::new(
            vec![0.0; 4],
            Feeling::from(Feeling::JOY),
            "Danced freely under fading light.".to_string(),
        );
        assert_eq!(record.trace_preview(6), "Danced...");
        assert_eq!(record.trace_preview(100), record.trace);
    }
}
