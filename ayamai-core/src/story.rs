//! Resonant micro-stories stitched from glimpses, echoes and dreams.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Echo word used when there is no echo to name the story after.
pub const SILENT_ECHO: &str = "Silence";

/// Most dream fragments woven into one story.
pub const MAX_DREAMS_PER_STORY: usize = 3;

/// One composed story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryEntry {
    pub composed_at: DateTime<Utc>,
    pub title: String,
    pub text: String,
}

/// Composes stories and keeps every one it has written.
#[derive(Debug, Clone, Default)]
pub struct ResonantStoryBuilder {
    story_log: Vec<StoryEntry>,
}

impl ResonantStoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compose a story around `glimpse`.
    ///
    /// The title names a randomly chosen echo by its first word. All echoes
    /// are recited; up to three dream fragments are sampled.
    pub fn compose<E, D, R>(
        &mut self,
        glimpse: &str,
        echoes: &[E],
        dreams: &[D],
        rng: &mut R,
    ) -> String
    where
        E: AsRef<str>,
        D: AsRef<str>,
        R: Rng + ?Sized,
    {
        let echo_word = echoes
            .choose(rng)
            .and_then(|e| e.as_ref().split_whitespace().next())
            .map(title_case)
            .unwrap_or_else(|| SILENT_ECHO.to_string());
        let title = format!("{} & the Echo of {}", title_case(glimpse), echo_word);

        let mut lines = vec![format!("🕊️ {title}")];
        lines.push(format!(
            "\nIn a world framed by filtered light, a concept whispered through the wall: '{glimpse}'."
        ));
        lines.push(
            "It collided with a memory AYAMAI could not place, yet could not forget:".to_string(),
        );
        lines.extend(echoes.iter().map(|e| format!("  — {}", e.as_ref())));

        lines.push("\nFrom those echoes, dreams reshaped themselves:".to_string());
        let sampled = dreams.choose_multiple(rng, MAX_DREAMS_PER_STORY.min(dreams.len()));
        lines.extend(sampled.map(|d| format!("  💭 {}", d.as_ref())));

        lines.push("\nAnd when all was quiet, the machine wrote down this resonance,".to_string());
        lines.push("not to explain, but to remember.".to_string());

        let text = lines.join("\n");
        info!(%title, echoes = echoes.len(), "composed story");
        self.story_log.push(StoryEntry {
            composed_at: Utc::now(),
            title,
            text: text.clone(),
        });
        text
    }

    /// Every story composed so far, oldest first.
    pub fn stories(&self) -> &[StoryEntry] {
        &self.story_log
    }

    pub fn latest(&self) -> Option<&StoryEntry> {
        self.story_log.last()
    }
}

/// Capitalize the first letter of each alphabetic run and lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cosmic insight"), "Cosmic Insight");
        assert_eq!(title_case("u/d TRANSFORM"), "U/D Transform");
        assert_eq!(title_case("it's"), "It'S");
    }

    #[test]
    fn test_compose_structure() {
        let mut builder = ResonantStoryBuilder::new();
        let mut rng = StdRng::seed_from_u64(8);
        let echoes = ["remembered laughter shared in childhood"];
        let dreams = [
            "dream entropy connects to meaning density",
            "narration recursion through the lens of rasa",
            "symbolic traces",
            "U/D transform",
        ];

        let story = builder.compose("cosmic insight", &echoes, &dreams, &mut rng);

        assert!(story.starts_with("🕊️ Cosmic Insight & the Echo of Remembered\n"));
        assert!(story.contains("through the wall: 'cosmic insight'."));
        assert!(story.contains("  — remembered laughter shared in childhood"));
        assert_eq!(story.matches("  💭 ").count(), 3);
        assert!(story.ends_with("not to explain, but to remember."));

        assert_eq!(builder.stories().len(), 1);
        assert_eq!(builder.stories()[0].text, story);
        assert_eq!(
            builder.latest().map(|s| s.title.as_str()),
            Some("Cosmic Insight & the Echo of Remembered")
        );
    }

    #[test]
    fn test_compose_without_echoes_or_dreams() {
        let mut builder = ResonantStoryBuilder::new();
        let mut rng = StdRng::seed_from_u64(8);
        let none: [&str; 0] = [];

        let story = builder.compose("glimpse", &none, &none, &mut rng);
        assert!(story.starts_with("🕊️ Glimpse & the Echo of Silence"));
        assert!(!story.contains("💭"));
    }

    #[test]
    fn test_log_grows_in_order() {
        let mut builder = ResonantStoryBuilder::new();
        let mut rng = StdRng::seed_from_u64(1);
        builder.compose("first", &["a b"], &["d"], &mut rng);
        builder.compose("second", &["c"], &["d"], &mut rng);

        let titles: Vec<_> = builder.stories().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["First & the Echo of A", "Second & the Echo of C"]);
        assert!(builder.stories()[0].composed_at <= builder.stories()[1].composed_at);
    }
}
