//! Stable embeddings for sound-feelings.
//!
//! A `(frequency, intensity)` pair is hashed into a spectral vector and
//! joined with a one-hot feeling basis, so the same sound with the same
//! feeling always lands on the same point.

use super::record::Feeling;
use sha2::{Digest, Sha256};

/// Feelings with a slot in the embedding basis, in slot order.
pub const FEELING_SPACE: [&str; 6] = [
    Feeling::CALM,
    Feeling::JOY,
    Feeling::CURIOSITY,
    Feeling::SADNESS,
    Feeling::AWE,
    Feeling::ANGER,
];

/// Width of the hashed spectral part.
pub const SPECTRAL_DIM: usize = 16;

/// Full embedding width.
pub const EMBEDDING_DIM: usize = FEELING_SPACE.len() + SPECTRAL_DIM;

/// Affective frequency bins in Hz, inclusive, checked in order.
const FREQUENCY_BINS: [(&str, u32, u32); 6] = [
    (Feeling::CALM, 100, 300),
    (Feeling::JOY, 400, 700),
    (Feeling::CURIOSITY, 700, 1100),
    (Feeling::SADNESS, 150, 500),
    (Feeling::AWE, 30, 100),
    (Feeling::ANGER, 1100, 1800),
];

/// Converts `(frequency, intensity)` pairs into stable embeddings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoundEmotionEmbedder;

impl SoundEmotionEmbedder {
    pub fn new() -> Self {
        Self
    }

    /// Hash `freq` and `intensity` into a unit-length spectral vector.
    pub fn frequency_to_hash(&self, freq: u32, intensity: u32) -> Vec<f32> {
        let digest = Sha256::digest(format!("{freq}_{intensity}").as_bytes());
        let vector = digest[..SPECTRAL_DIM].iter().map(|&b| f32::from(b)).collect();
        normalize(vector)
    }

    /// One-hot basis for a feeling. Feelings outside the space map to zeros.
    pub fn feeling_vector(&self, feeling: &str) -> Vec<f32> {
        let mut vector = vec![0.0; FEELING_SPACE.len()];
        if let Some(slot) = FEELING_SPACE.iter().position(|f| *f == feeling) {
            vector[slot] = 1.0;
        }
        vector
    }

    /// Joint unit-length embedding of a feeling and a sound.
    pub fn generate_embedding(&self, feeling: &str, freq: u32, intensity: u32) -> Vec<f32> {
        let mut combined = self.feeling_vector(feeling);
        combined.extend(self.frequency_to_hash(freq, intensity));
        normalize(combined)
    }
}

/// The first bin containing `freq`, if any.
pub fn feeling_for_frequency(freq: u32) -> Option<Feeling> {
    FREQUENCY_BINS
        .iter()
        .find(|(_, low, high)| (*low..=*high).contains(&freq))
        .map(|(feeling, _, _)| Feeling::from(*feeling))
}

fn normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_embedding_is_deterministic_and_unit_length() {
        let embedder = SoundEmotionEmbedder::new();
        let a = embedder.generate_embedding(Feeling::CURIOSITY, 800, 64);
        let b = embedder.generate_embedding(Feeling::CURIOSITY, 800, 64);

        assert_eq!(a, b);
        assert_eq!(a.len(), EMBEDDING_DIM);
        assert!((norm(&a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_different_sounds_differ() {
        let embedder = SoundEmotionEmbedder::new();
        let a = embedder.frequency_to_hash(800, 64);
        let b = embedder.frequency_to_hash(801, 64);
        assert_ne!(a, b);
        assert!((norm(&a) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_feeling_slot() {
        let embedder = SoundEmotionEmbedder::new();
        assert_eq!(
            embedder.feeling_vector(Feeling::SADNESS),
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0]
        );
        assert!(embedder.feeling_vector("nostalgia").iter().all(|x| *x == 0.0));

        let unknown = embedder.generate_embedding("nostalgia", 440, 10);
        assert!(unknown[..FEELING_SPACE.len()].iter().all(|x| *x == 0.0));
        assert!((norm(&unknown) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_feeling_for_frequency_uses_first_bin() {
        assert_eq!(feeling_for_frequency(200).as_ref().map(Feeling::as_str), Some("calm"));
        // 450 falls in both joy and sadness; joy is checked first.
        assert_eq!(feeling_for_frequency(450).as_ref().map(Feeling::as_str), Some("joy"));
        assert_eq!(feeling_for_frequency(350).as_ref().map(Feeling::as_str), Some("sadness"));
        assert_eq!(feeling_for_frequency(100).as_ref().map(Feeling::as_str), Some("calm"));
        assert_eq!(feeling_for_frequency(50).as_ref().map(Feeling::as_str), Some("awe"));
        assert_eq!(feeling_for_frequency(1500).as_ref().map(Feeling::as_str), Some("anger"));
        assert_eq!(feeling_for_frequency(5000), None);
    }
}
