//! AYAMAI: a dreaming, feeling memory engine.
//!
//! This crate provides:
//! - A concept graph of remembered understanding, walked depth-first
//! - An append-only affective memory of feeling-tagged traces
//! - Sound-feeling embeddings and symbolic affective states
//! - Dream remixing and resonant story composition
//! - Snapshot persistence
//!
//! # Quick Start
//!
//! ```ignore
//! use ayamai_core::{ResonanceConfig, ResonantSession};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResonanceConfig::new().with_mood("awe");
//!     let mut session = ResonantSession::new(config);
//!
//!     session.link("Ayurveda", "Dosha", "explains");
//!     session.remember("awe", 80, 120, "Felt connected to stars at dusk.");
//!
//!     for fragment in session.dream(Some("Ayurveda")).await {
//!         println!("{fragment}");
//!     }
//!     println!("{}", session.compose_story("cosmic insight"));
//!
//!     session.save("ayamai.json").await?;
//!     Ok(())
//! }
//! ```

pub mod affective;
pub mod dream;
pub mod entropy;
pub mod generator;
pub mod id;
pub mod memory_graph;
pub mod persist;
pub mod session;
pub mod story;
pub mod testing;

// Primary public API
pub use affective::{
    AffectiveMemoryRecord, AffectiveMemoryStore, AffectiveState, Feeling, SoundEmotionEmbedder,
};
pub use dream::DreamEngine;
pub use generator::{GeminiGenerator, Generation, GeneratorError, RetryPolicy, TextGenerator};
pub use id::{ConceptId, RecordId};
pub use memory_graph::{ConceptGraph, ConceptNode, DEFAULT_RELATION};
pub use persist::{PersistError, Snapshot};
pub use session::{ResonanceConfig, ResonantSession, SessionError};
pub use story::ResonantStoryBuilder;
pub use testing::MockGenerator;
