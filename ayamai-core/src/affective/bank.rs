//! Append-only store of affective memories.

use super::record::{AffectiveMemoryRecord, Feeling};
use crate::id::RecordId;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default number of records returned by [`AffectiveMemoryStore::search_by_feeling`].
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Default number of records returned by [`AffectiveMemoryStore::random_sample`].
pub const DEFAULT_SAMPLE_LIMIT: usize = 3;

/// Emotional experiences stored as time-stamped events.
///
/// Records are only ever appended; there is no update or delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AffectiveMemoryStore {
    memory_log: Vec<AffectiveMemoryRecord>,
}

impl AffectiveMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an experience and return its id.
    ///
    /// Neither the embedding shape nor the feeling vocabulary is checked.
    pub fn store_experience(
        &mut self,
        embedding: Vec<f32>,
        feeling: impl Into<Feeling>,
        trace: impl Into<String>,
    ) -> RecordId {
        let record = AffectiveMemoryRecord::new(embedding, feeling.into(), trace.into());
        let id = record.id;
        debug!(
            feeling = %record.feeling,
            trace = %record.trace_preview(40),
            "stored affective memory"
        );
        self.memory_log.push(record);
        id
    }

    /// Up to `limit` records whose feeling equals `feeling`, in storage order.
    pub fn search_by_feeling(&self, feeling: &str, limit: usize) -> Vec<&AffectiveMemoryRecord> {
        self.memory_log
            .iter()
            .filter(|m| m.feeling == *feeling)
            .take(limit)
            .collect()
    }

    /// Traces of up to `limit` records with the given feeling.
    pub fn traces_for(&self, feeling: &str, limit: usize) -> Vec<&str> {
        self.search_by_feeling(feeling, limit)
            .into_iter()
            .map(|m| m.trace.as_str())
            .collect()
    }

    /// A uniform sample of `min(limit, len)` distinct records.
    pub fn random_sample(&self, limit: usize) -> Vec<&AffectiveMemoryRecord> {
        self.random_sample_with(&mut rand::thread_rng(), limit)
    }

    /// [`AffectiveMemoryStore::random_sample`] with a caller-supplied generator.
    pub fn random_sample_with<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        limit: usize,
    ) -> Vec<&AffectiveMemoryRecord> {
        let amount = limit.min(self.memory_log.len());
        self.memory_log.choose_multiple(rng, amount).collect()
    }

    /// Every record, in insertion order.
    pub fn get_all(&self) -> &[AffectiveMemoryRecord] {
        &self.memory_log
    }

    /// Look up a record by id.
    pub fn get(&self, id: RecordId) -> Option<&AffectiveMemoryRecord> {
        self.memory_log.iter().find(|m| m.id == id)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.memory_log.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.memory_log.is_empty()
    }
}
