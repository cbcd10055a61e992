//! Dreaming: remixing remembered concepts into surreal fragments.
//!
//! Without a generator, a fragment is a local recombination of two memory
//! fragments, sometimes tinted by an affective trace recalled for the dream
//! mood. With a generator, the model is asked for the fragment and the local
//! remix is the fallback whenever it cannot answer.

use crate::affective::{AffectiveMemoryStore, Feeling, DEFAULT_SEARCH_LIMIT};
use crate::generator::{Generation, TextGenerator};
use crate::memory_graph::ConceptGraph;
use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Moods a dream falls into when none is given.
pub const DREAM_MOODS: [&str; 3] = [Feeling::CURIOSITY, Feeling::JOY, Feeling::AWE];

/// Chance that a local fragment is tinted by an affective trace.
pub const FELT_LIKE_PROBABILITY: f64 = 0.5;

/// Default token budget for one generated fragment.
pub const DEFAULT_FRAGMENT_TOKENS: usize = 60;

/// Pick a dream mood uniformly from [`DREAM_MOODS`].
pub fn random_mood<R: Rng + ?Sized>(rng: &mut R) -> Feeling {
    let mood = DREAM_MOODS.choose(rng).copied().unwrap_or(Feeling::CURIOSITY);
    Feeling::from(mood)
}

/// Produces and logs dream fragments.
pub struct DreamEngine {
    fragments: Vec<String>,
    entropy: f64,
    mood: Feeling,
    dream_log: Vec<String>,
    generator: Option<Arc<dyn TextGenerator>>,
    max_tokens: usize,
}

impl DreamEngine {
    /// Create an engine over `fragments`.
    ///
    /// `entropy` is clamped to `[0, 1]`; it is the chance a remix reads as
    /// "through the lens of" rather than "connects to". The mood is chosen
    /// at random until [`DreamEngine::with_mood`] sets one.
    pub fn new(fragments: Vec<String>, entropy: f64) -> Self {
        Self {
            fragments,
            entropy: clamp_entropy(entropy),
            mood: random_mood(&mut rand::thread_rng()),
            dream_log: Vec::new(),
            generator: None,
            max_tokens: DEFAULT_FRAGMENT_TOKENS,
        }
    }

    pub fn with_mood(mut self, mood: impl Into<Feeling>) -> Self {
        self.mood = mood.into();
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn mood(&self) -> &Feeling {
        &self.mood
    }

    pub fn entropy(&self) -> f64 {
        self.entropy
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Every fragment dreamt so far, oldest first.
    pub fn dream_log(&self) -> &[String] {
        &self.dream_log
    }

    /// Add fragments reached by walking the graph from `start`.
    ///
    /// Fragments already known are skipped. Returns how many were added.
    pub fn seed_from_graph(&mut self, graph: &ConceptGraph, start: &str, depth: usize) -> usize {
        let before = self.fragments.len();
        for concept in graph.traverse_memory(start, depth) {
            if !self.fragments.contains(&concept) {
                self.fragments.push(concept);
            }
        }
        let added = self.fragments.len() - before;
        debug!(start, depth, added, "seeded dream from concept graph");
        added
    }

    /// Traces remembered under the dream mood.
    pub fn sample_emotional_memory<'a>(&self, store: &'a AffectiveMemoryStore) -> Vec<&'a str> {
        store.traces_for(self.mood.as_str(), DEFAULT_SEARCH_LIMIT)
    }

    /// Dream one fragment. `None` when there is nothing to dream about.
    pub async fn generate_fragment<R: Rng + ?Sized>(
        &self,
        store: Option<&AffectiveMemoryStore>,
        rng: &mut R,
    ) -> Option<String> {
        if self.fragments.is_empty() {
            debug!("no memory fragments to dream about");
            return None;
        }

        if let Some(generator) = &self.generator {
            match generator.generate(&self.prompt(), self.max_tokens).await {
                Ok(Generation::Text(text)) if !text.trim().is_empty() => {
                    return Some(text.trim().to_string());
                }
                Ok(Generation::Text(_)) => {
                    debug!(generator = generator.name(), "empty dream text, remixing locally");
                }
                Ok(Generation::NoOutput { reason }) => {
                    debug!(
                        generator = generator.name(),
                        %reason,
                        "no dream output, remixing locally"
                    );
                }
                Err(err) => {
                    warn!(
                        generator = generator.name(),
                        error = %err,
                        "dream generation failed, remixing locally"
                    );
                }
            }
        }

        self.remix(store, rng)
    }

    /// Dream `steps` fragments and append them to the log.
    ///
    /// Returns the fragments produced by this cycle.
    pub async fn run_cycle<R: Rng + ?Sized>(
        &mut self,
        steps: usize,
        store: Option<&AffectiveMemoryStore>,
        rng: &mut R,
    ) -> &[String] {
        info!(mood = %self.mood, steps, "dreaming");
        let start = self.dream_log.len();
        for _ in 0..steps {
            match self.generate_fragment(store, rng).await {
                Some(fragment) => {
                    info!(%fragment, "dream fragment");
                    self.dream_log.push(fragment);
                }
                None => break,
            }
        }
        info!(dreamt = self.dream_log.len() - start, "dream ended");
        &self.dream_log[start..]
    }

    fn prompt(&self) -> String {
        format!(
            "Dream fragment: combine these concepts: {}. Mood: {}. \
             Write one poetic, surreal dream fragment.",
            self.fragments.join(", "),
            self.mood
        )
    }

    fn remix<R: Rng + ?Sized>(
        &self,
        store: Option<&AffectiveMemoryStore>,
        rng: &mut R,
    ) -> Option<String> {
        let base = self.fragments.choose(rng)?;
        let remix = self.fragments.choose(rng)?;

        let combo = if rng.gen::<f64>() < self.entropy {
            format!("{base} through the lens of {remix}")
        } else {
            format!("{base} connects to {remix}")
        };

        let Some(store) = store else {
            return Some(combo);
        };
        if !rng.gen_bool(FELT_LIKE_PROBABILITY) {
            return Some(combo);
        }

        let traces = self.sample_emotional_memory(store);
        let felt = traces
            .choose(rng)
            .map(|t| t.to_string())
            .unwrap_or_else(|| combo.clone());
        Some(format!("{combo} ↝ felt like: '{felt}'"))
    }
}

fn clamp_entropy(entropy: f64) -> f64 {
    if entropy.is_nan() {
        0.0
    } else {
        entropy.clamp(0.0, 1.0)
    }
}
