//! ResonantSession - the primary public API for the resonant loop.
//!
//! A session owns long-term concept memory, affective memory and the
//! current feeling, and wires them into dreaming and storytelling. A text
//! generator is optional; without one every step runs locally.

use crate::affective::{
    feeling_for_frequency, AffectiveMemoryStore, AffectiveState, Feeling, SoundEmotionEmbedder,
    DEFAULT_SAMPLE_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use crate::dream::{random_mood, DreamEngine, DEFAULT_FRAGMENT_TOKENS};
use crate::entropy::{entropy_twist, rank_relevant_lines, SURREAL_ELEMENTS};
use crate::generator::{GeminiGenerator, GeneratorError, TextGenerator};
use crate::id::RecordId;
use crate::memory_graph::ConceptGraph;
use crate::persist::{PersistError, Snapshot};
use crate::story::{ResonantStoryBuilder, StoryEntry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Errors from ResonantSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),
}

/// Concepts every session starts dreaming from.
pub const DEFAULT_SEED_CONCEPTS: [&str; 6] = [
    "Ayurvedic rasa theory",
    "dream entropy",
    "narration recursion",
    "U/D transform",
    "meaning density",
    "symbolic story traces",
];

/// Configuration for a resonant session.
#[derive(Debug, Clone)]
pub struct ResonanceConfig {
    /// Dream mood. Chosen at random for each dream when unset.
    pub mood: Option<Feeling>,

    /// Initial affective state.
    pub affect: Feeling,

    /// Remix surrealism in `[0, 1]`.
    pub entropy: f64,

    /// Fragments per dream cycle.
    pub dream_steps: usize,

    /// Expansion depth when walking the concept graph.
    pub traversal_depth: usize,

    /// Token budget for each generated fragment.
    pub max_output_tokens: usize,

    /// Concepts dreams start from before any graph walk.
    pub seed_concepts: Vec<String>,

    /// Seed for the session's random source, for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self {
            mood: None,
            affect: Feeling::from(Feeling::CURIOSITY),
            entropy: 0.7,
            dream_steps: 5,
            traversal_depth: 2,
            max_output_tokens: DEFAULT_FRAGMENT_TOKENS,
            seed_concepts: DEFAULT_SEED_CONCEPTS.iter().map(|s| s.to_string()).collect(),
            rng_seed: None,
        }
    }
}

impl ResonanceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the dream mood.
    pub fn with_mood(mut self, mood: impl Into<Feeling>) -> Self {
        self.mood = Some(mood.into());
        self
    }

    /// Set the initial affective state.
    pub fn with_affect(mut self, affect: impl Into<Feeling>) -> Self {
        self.affect = affect.into();
        self
    }

    pub fn with_entropy(mut self, entropy: f64) -> Self {
        self.entropy = entropy;
        self
    }

    pub fn with_dream_steps(mut self, steps: usize) -> Self {
        self.dream_steps = steps;
        self
    }

    pub fn with_traversal_depth(mut self, depth: usize) -> Self {
        self.traversal_depth = depth;
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: usize) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Replace the seed concepts.
    pub fn with_seed_concepts<I, S>(mut self, concepts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seed_concepts = concepts.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// The resonant loop: remember, feel, dream, narrate.
pub struct ResonantSession {
    config: ResonanceConfig,
    graph: ConceptGraph,
    memories: AffectiveMemoryStore,
    affect: AffectiveState,
    embedder: SoundEmotionEmbedder,
    generator: Option<Arc<dyn TextGenerator>>,
    stories: ResonantStoryBuilder,
    dream_log: Vec<String>,
    rng: StdRng,
}

impl ResonantSession {
    /// Create an offline session with empty memory.
    pub fn new(config: ResonanceConfig) -> Self {
        Self::with_memory(config, ConceptGraph::new(), AffectiveMemoryStore::new())
    }

    /// Create a session around existing memory.
    pub fn with_memory(
        config: ResonanceConfig,
        graph: ConceptGraph,
        memories: AffectiveMemoryStore,
    ) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            affect: AffectiveState::new(config.affect.clone()),
            config,
            graph,
            memories,
            embedder: SoundEmotionEmbedder::new(),
            generator: None,
            stories: ResonantStoryBuilder::new(),
            dream_log: Vec::new(),
            rng,
        }
    }

    /// Create a session that dreams through Gemini, configured from the environment.
    pub fn from_env(config: ResonanceConfig) -> Result<Self, SessionError> {
        let generator = GeminiGenerator::from_env()?;
        Ok(Self::new(config).with_generator(Arc::new(generator)))
    }

    /// Load memory from a snapshot file.
    pub async fn load(
        path: impl AsRef<Path>,
        config: ResonanceConfig,
    ) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let snapshot = Snapshot::load_json(path).await?;
        info!(
            path = %path.display(),
            concepts = snapshot.graph.node_count(),
            memories = snapshot.memories.len(),
            "loaded snapshot"
        );
        Ok(Self::with_memory(config, snapshot.graph, snapshot.memories))
    }

    /// Save memory to a snapshot file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        let path = path.as_ref();
        Snapshot::new(self.graph.clone(), self.memories.clone())
            .save_json(path)
            .await?;
        info!(
            path = %path.display(),
            concepts = self.graph.node_count(),
            memories = self.memories.len(),
            "saved snapshot"
        );
        Ok(())
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    // =========================================================================
    // Memory
    // =========================================================================

    /// Link two concepts, creating either if needed.
    pub fn link(&mut self, source: &str, target: &str, relation: &str) {
        self.graph.link(source, target, relation);
    }

    /// Add a concept with attributes and behaviors. Existing concepts are unchanged.
    pub fn add_concept(&mut self, concept: &str, attributes: Vec<String>, behaviors: Vec<String>) {
        self.graph.add_node(concept, attributes, behaviors);
    }

    /// Walk the concept graph from `start` to the configured depth.
    pub fn traverse(&self, start: &str) -> Vec<String> {
        self.graph.traverse_memory(start, self.config.traversal_depth)
    }

    /// Walk the concept graph from `start` to an explicit depth.
    pub fn traverse_to(&self, start: &str, depth: usize) -> Vec<String> {
        self.graph.traverse_memory(start, depth)
    }

    /// Remember a sound-feeling, embedding it deterministically.
    pub fn remember(
        &mut self,
        feeling: impl Into<Feeling>,
        freq: u32,
        intensity: u32,
        trace: impl Into<String>,
    ) -> RecordId {
        let feeling = feeling.into();
        let embedding = self
            .embedder
            .generate_embedding(feeling.as_str(), freq, intensity);
        self.memories.store_experience(embedding, feeling, trace)
    }

    /// Remember a sound whose feeling is read from its frequency.
    ///
    /// Returns `None` when the frequency falls in no affective bin.
    pub fn remember_sound(
        &mut self,
        freq: u32,
        intensity: u32,
        trace: impl Into<String>,
    ) -> Option<RecordId> {
        let feeling = feeling_for_frequency(freq)?;
        Some(self.remember(feeling, freq, intensity, trace))
    }

    /// Traces remembered under `feeling`.
    pub fn recall(&self, feeling: &str) -> Vec<&str> {
        self.memories.traces_for(feeling, DEFAULT_SEARCH_LIMIT)
    }

    // =========================================================================
    // Feeling
    // =========================================================================

    /// Shift the affective state. Unknown feelings are ignored.
    pub fn feel(&mut self, feeling: &str) -> bool {
        self.affect.shift(feeling)
    }

    /// Shift to a random known affective state.
    pub fn feel_randomly(&mut self) -> Feeling {
        self.affect.randomize(&mut self.rng).clone()
    }

    /// Dream entropy after affective modulation.
    ///
    /// A state with a `novelty_bias` pulls entropy halfway toward it.
    pub fn effective_entropy(&self) -> f64 {
        let entropy = self.config.entropy.clamp(0.0, 1.0);
        match self.affect.weight("novelty_bias") {
            Some(bias) => (entropy + bias) / 2.0,
            None => entropy,
        }
    }

    // =========================================================================
    // Dreaming and narration
    // =========================================================================

    /// Run one dream cycle, optionally seeded by a graph walk from `start`.
    ///
    /// Returns the fragments dreamt in this cycle.
    pub async fn dream(&mut self, start: Option<&str>) -> Vec<String> {
        let mood = match &self.config.mood {
            Some(mood) => mood.clone(),
            None => random_mood(&mut self.rng),
        };
        let fragments = self.config.seed_concepts.clone();
        let mut engine = DreamEngine::new(fragments, self.effective_entropy())
            .with_mood(mood)
            .with_max_tokens(self.config.max_output_tokens);
        if let Some(generator) = &self.generator {
            engine = engine.with_generator(generator.clone());
        }
        if let Some(start) = start {
            engine.seed_from_graph(&self.graph, start, self.config.traversal_depth);
        }

        let dreamt = engine
            .run_cycle(self.config.dream_steps, Some(&self.memories), &mut self.rng)
            .await
            .to_vec();
        self.dream_log.extend(dreamt.iter().cloned());
        dreamt
    }

    /// Compose a story around `glimpse` from memory echoes and past dreams.
    ///
    /// Echoes are the traces felt under the current affective state; when
    /// there are none, the traces most relevant to the glimpse stand in.
    pub fn compose_story(&mut self, glimpse: &str) -> String {
        let mut echoes: Vec<String> = self
            .recall(self.affect.current().as_str())
            .into_iter()
            .map(String::from)
            .collect();
        if echoes.is_empty() {
            let traces: Vec<&str> = self
                .memories
                .get_all()
                .iter()
                .map(|m| m.trace.as_str())
                .collect();
            echoes = rank_relevant_lines(glimpse, &traces.join("\n"), DEFAULT_SAMPLE_LIMIT);
        }
        self.stories
            .compose(glimpse, &echoes, &self.dream_log, &mut self.rng)
    }

    /// Decorate `semantics` with surreal imagery scaled by its entropy.
    pub fn twist(&mut self, semantics: &str) -> String {
        entropy_twist(semantics, &SURREAL_ELEMENTS, &mut self.rng)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &ResonanceConfig {
        &self.config
    }

    pub fn graph(&self) -> &ConceptGraph {
        &self.graph
    }

    pub fn memories(&self) -> &AffectiveMemoryStore {
        &self.memories
    }

    pub fn affect(&self) -> &AffectiveState {
        &self.affect
    }

    /// Every fragment dreamt in this session, oldest first.
    pub fn dream_log(&self) -> &[String] {
        &self.dream_log
    }

    pub fn stories(&self) -> &[StoryEntry] {
        self.stories.stories()
    }

    /// Name of the text generator, if one is attached.
    pub fn generator_name(&self) -> Option<&str> {
        self.generator.as_deref().map(|g| g.name())
    }

    pub fn is_offline(&self) -> bool {
        self.generator.is_none()
    }
}
