//! Testing utilities.
//!
//! - `MockGenerator` returns scripted generations without network calls
//! - `seeded_session` builds a session with a small, known memory

use crate::generator::{Generation, GeneratorError, TextGenerator};
use crate::session::{ResonanceConfig, ResonantSession};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Reply used once the script runs dry.
pub const EXHAUSTED_REASON: &str = "mock generator has no more scripted replies";

/// A generator that replays a script of outcomes in order.
///
/// Every prompt it receives is recorded so tests can assert on it.
#[derive(Default)]
pub struct MockGenerator {
    script: Mutex<VecDeque<Result<Generation, GeneratorError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    /// Create a mock with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that answers with each text in turn.
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for text in texts {
            mock.queue(Ok(Generation::Text(text.into())));
        }
        mock
    }

    /// Queue a text reply.
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.queue(Ok(Generation::Text(text.into())));
        self
    }

    /// Queue a degraded reply.
    pub fn then_no_output(self, reason: impl Into<String>) -> Self {
        self.queue(Ok(Generation::no_output(reason)));
        self
    }

    /// Queue a failure.
    pub fn then_error(self, error: GeneratorError) -> Self {
        self.queue(Err(error));
        self
    }

    /// Append an outcome to the script.
    pub fn queue(&self, outcome: Result<Generation, GeneratorError>) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _max_tokens: usize,
    ) -> Result<Generation, GeneratorError> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(prompt.to_string());
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(Generation::no_output(EXHAUSTED_REASON)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// An offline session with a few linked concepts and feelings.
///
/// Concepts: `Ayurveda -explains-> Dosha -influences-> Mind -guides-> Dreams`.
/// Memories: one `joy`, one `sadness`, one `awe` trace.
pub fn seeded_session(config: ResonanceConfig) -> ResonantSession {
    let mut session = ResonantSession::new(config);
    session.link("Ayurveda", "Dosha", "explains");
    session.link("Dosha", "Mind", "influences");
    session.link("Mind", "Dreams", "guides");
    session.remember("joy", 520, 90, "Danced freely under fading light.");
    session.remember("sadness", 300, 40, "Watched memory dissolve in rain.");
    session.remember("awe", 80, 120, "Felt connected to stars at dusk.");
    session
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_replays_script_then_degrades() {
        let mock = MockGenerator::with_texts(["first"])
            .then_no_output("blocked")
            .then_error(GeneratorError::Rejected("bad".into()));

        assert_eq!(
            mock.generate("a", 10).await.unwrap(),
            Generation::Text("first".into())
        );
        assert_eq!(
            mock.generate("b", 10).await.unwrap(),
            Generation::no_output("blocked")
        );
        assert!(mock.generate("c", 10).await.is_err());
        assert_eq!(
            mock.generate("d", 10).await.unwrap(),
            Generation::no_output(EXHAUSTED_REASON)
        );

        assert_eq!(mock.prompts(), vec!["a", "b", "c", "d"]);
        assert_eq!(mock.calls(), 4);
        assert_eq!(mock.remaining(), 0);
    }
}
