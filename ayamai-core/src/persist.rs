//! Snapshot export and import.
//!
//! A snapshot is the concept graph plus the affective memory log, written
//! as pretty JSON. It is an export format, not a durability guarantee.

use crate::affective::AffectiveMemoryStore;
use crate::memory_graph::ConceptGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to restore a session's memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version for compatibility checking.
    pub version: u32,

    /// When the snapshot was taken.
    pub saved_at: DateTime<Utc>,

    /// Concepts in creation order, with their links.
    pub graph: ConceptGraph,

    /// Affective records in insertion order.
    pub memories: AffectiveMemoryStore,
}

impl Snapshot {
    pub fn new(graph: ConceptGraph, memories: AffectiveMemoryStore) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            graph,
            memories,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file, rejecting other format versions.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Parse a snapshot from a JSON string.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        let snapshot: Self = serde_json::from_str(content)?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Snapshot {
        let mut graph = ConceptGraph::new();
        graph.link("Ayurveda", "Dosha", "explains");
        let mut memories = AffectiveMemoryStore::new();
        memories.store_experience(vec![0.5, 0.5], "awe", "Felt connected to stars at dusk.");
        Snapshot::new(graph, memories)
    }

    #[test]
    fn test_json_round_trip() {
        let snapshot = sample();
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = Snapshot::from_json(&json).unwrap();

        assert_eq!(restored.graph.node_count(), 2);
        assert_eq!(
            restored.graph.traverse_memory("Ayurveda", 2),
            vec!["Ayurveda", "Dosha"]
        );
        assert_eq!(
            restored.memories.traces_for("awe", 5),
            vec!["Felt connected to stars at dusk."]
        );
        assert_eq!(restored.saved_at, snapshot.saved_at);
    }

    #[test]
    fn test_version_mismatch() {
        let mut snapshot = sample();
        snapshot.version = 99;
        let json = serde_json::to_string(&snapshot).unwrap();

        match Snapshot::from_json(&json) {
            Err(PersistError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SNAPSHOT_VERSION);
                assert_eq!(found, 99);
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_garbage_is_json_error() {
        assert!(matches!(
            Snapshot::from_json("{not json"),
            Err(PersistError::Json(_))
        ));
    }
}
