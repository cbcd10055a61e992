//! Affective memory: feelings, their embeddings, and the store that keeps them.

mod bank;
mod embedding;
mod record;
mod state;

pub use bank::{AffectiveMemoryStore, DEFAULT_SAMPLE_LIMIT, DEFAULT_SEARCH_LIMIT};
pub use embedding::{
    feeling_for_frequency, SoundEmotionEmbedder, EMBEDDING_DIM, FEELING_SPACE, SPECTRAL_DIM,
};
pub use record::{AffectiveMemoryRecord, Feeling};
pub use state::{AffectiveProfile, AffectiveState, AFFECTIVE_PROFILES};
