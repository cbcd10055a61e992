//! Symbolic affective states.
//!
//! A state is a named direction vector used to bias generation: how much to
//! favour novelty, how long to narrate, how tightly to link back to self.

use super::record::Feeling;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// A known affective state and its modulation weights.
#[derive(Debug, Clone)]
pub struct AffectiveProfile {
    pub feeling: &'static str,
    pub modulation: Vec<(&'static str, f64)>,
}

impl AffectiveProfile {
    fn new(feeling: &'static str, modulation: &[(&'static str, f64)]) -> Self {
        Self {
            feeling,
            modulation: modulation.to_vec(),
        }
    }
}

lazy_static::lazy_static! {
    /// Every state [`AffectiveState::shift`] accepts.
    pub static ref AFFECTIVE_PROFILES: Vec<AffectiveProfile> = vec![
        AffectiveProfile::new(Feeling::CURIOSITY, &[("novelty_bias", 0.9), ("focus", 0.6)]),
        AffectiveProfile::new(
            Feeling::SADNESS,
            &[("entropy_bias", 0.3), ("reflection_weight", 0.9)],
        ),
        AffectiveProfile::new(Feeling::JOY, &[("novelty_bias", 0.7), ("expansion", 0.8)]),
        AffectiveProfile::new(Feeling::FEAR, &[("novelty_bias", 0.2), ("precision", 0.9)]),
        AffectiveProfile::new(
            Feeling::COMPASSION,
            &[("self_linking", 0.8), ("narrative_length", 1.2)],
        ),
    ];
}

fn profile(feeling: &str) -> Option<&'static AffectiveProfile> {
    AFFECTIVE_PROFILES.iter().find(|p| p.feeling == feeling)
}

/// The machine's current feeling and its modulation vector.
#[derive(Debug, Clone)]
pub struct AffectiveState {
    current: Feeling,
    profile: Option<&'static AffectiveProfile>,
}

impl AffectiveState {
    /// Start in `initial`. An unknown feeling keeps its name but modulates nothing.
    pub fn new(initial: impl Into<Feeling>) -> Self {
        let current = initial.into();
        let profile = profile(current.as_str());
        Self { current, profile }
    }

    /// Move to a known state. Returns `false` and keeps the current state
    /// when `feeling` is unknown.
    pub fn shift(&mut self, feeling: &str) -> bool {
        match profile(feeling) {
            Some(profile) => {
                self.current = Feeling::from(profile.feeling);
                self.profile = Some(profile);
                debug!(feeling, "affective state shifted");
                true
            }
            None => {
                warn!(feeling, current = %self.current, "unknown affective state");
                false
            }
        }
    }

    /// Shift to a uniformly chosen known state.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Feeling {
        if let Some(profile) = AFFECTIVE_PROFILES.choose(rng) {
            self.shift(profile.feeling);
        }
        &self.current
    }

    pub fn current(&self) -> &Feeling {
        &self.current
    }

    /// Modulation weights, empty for an unknown state.
    pub fn modulation(&self) -> &[(&'static str, f64)] {
        self.profile.map(|p| p.modulation.as_slice()).unwrap_or(&[])
    }

    /// One modulation weight by key.
    pub fn weight(&self, key: &str) -> Option<f64> {
        self.modulation()
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, w)| *w)
    }
}

impl Default for AffectiveState {
    fn default() -> Self {
        Self::new(Feeling::CURIOSITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_known_modulation() {
        let state = AffectiveState::new(Feeling::JOY);
        assert_eq!(state.current().as_str(), "joy");
        assert_eq!(state.modulation(), &[("novelty_bias", 0.7), ("expansion", 0.8)]);
        assert_eq!(state.weight("expansion"), Some(0.8));
        assert_eq!(state.weight("focus"), None);
    }

    #[test]
    fn test_shift_rejects_unknown() {
        let mut state = AffectiveState::new(Feeling::JOY);
        assert!(state.shift(Feeling::SADNESS));
        assert_eq!(state.weight("reflection_weight"), Some(0.9));

        assert!(!state.shift("ennui"));
        assert_eq!(state.current().as_str(), "sadness");
    }

    #[test]
    fn test_unknown_initial_state() {
        let state = AffectiveState::new("awe");
        assert_eq!(state.current().as_str(), "awe");
        assert!(state.modulation().is_empty());
    }

    #[test]
    fn test_randomize_lands_on_known_state() {
        let mut state = AffectiveState::new("awe");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            let feeling = state.randomize(&mut rng).clone();
            assert!(AFFECTIVE_PROFILES.iter().any(|p| feeling == *p.feeling));
            assert!(!state.modulation().is_empty());
        }
    }
}
