//! Text entropy and lightweight relevance ranking.
//!
//! Ranking uses a small TF-IDF model fitted per call: a query and its
//! candidate lines form the corpus, and candidates are ordered by cosine
//! similarity to the query.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Sparse term-weight vector.
pub type SparseVector = BTreeMap<String, f64>;

/// Surreal imagery mixed in by [`entropy_twist`].
pub const SURREAL_ELEMENTS: [&str; 8] = [
    "floating child",
    "talking fog",
    "echoes becoming birds",
    "time folding in corners",
    "clouds whispering secrets",
    "buildings bending inward",
    "umbrellas reversing rain",
    "neon shadows dancing",
];

/// Character-frequency Shannon entropy in bits. Empty text has zero entropy.
pub fn shannon_entropy(text: &str) -> f64 {
    let mut counts: BTreeMap<char, usize> = BTreeMap::new();
    let mut total = 0usize;
    for c in text.chars() {
        *counts.entry(c).or_default() += 1;
        total += 1;
    }
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    -counts
        .values()
        .map(|&n| {
            let p = n as f64 / total;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Lowercase word tokens of two or more alphanumeric characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// A TF-IDF model with smoothed inverse document frequency.
#[derive(Debug, Clone, Default)]
pub struct TfIdf {
    idf: HashMap<String, f64>,
}

impl TfIdf {
    /// Fit the vocabulary and IDF weights on a corpus.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let n = documents.len() as f64;
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<String> = tokenize(doc.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_default() += 1;
            }
        }
        let idf = document_frequency
            .into_iter()
            .map(|(term, df)| {
                let weight = ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0;
                (term, weight)
            })
            .collect();
        Self { idf }
    }

    /// Number of distinct terms seen while fitting.
    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    /// L2-normalized TF-IDF vector for `document`. Unknown terms are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut vector = SparseVector::new();
        for term in tokenize(document) {
            if let Some(idf) = self.idf.get(&term) {
                *vector.entry(term).or_insert(0.0) += idf;
            }
        }
        let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            vector.values_mut().for_each(|w| *w /= norm);
        }
        vector
    }
}

/// Cosine similarity of two sparse vectors; zero when either is empty.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let dot: f64 = a
        .iter()
        .filter_map(|(term, wa)| b.get(term).map(|wb| wa * wb))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Order `candidates` by similarity to `query`; ties keep their input order.
fn rank_by_similarity(query: &str, candidates: Vec<String>, top_n: usize) -> Vec<String> {
    if candidates.is_empty() || top_n == 0 {
        return Vec::new();
    }
    let mut corpus = Vec::with_capacity(candidates.len() + 1);
    corpus.push(query);
    corpus.extend(candidates.iter().map(String::as_str));
    let model = TfIdf::fit(corpus.as_slice());
    let query_vector = model.transform(query);

    let mut scored: Vec<(f64, String)> = candidates
        .into_iter()
        .map(|c| (cosine_similarity(&query_vector, &model.transform(&c)), c))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().take(top_n).map(|(_, c)| c).collect()
}

/// The `top_n` non-blank lines of `text` most similar to `query`.
pub fn rank_relevant_lines(query: &str, text: &str, top_n: usize) -> Vec<String> {
    let lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    rank_by_similarity(query, lines, top_n)
}

/// The `top_n` distinct words across `lines` most similar to `goal`.
pub fn relevant_terms<S: AsRef<str>>(goal: &str, lines: &[S], top_n: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let words = lines
        .iter()
        .flat_map(|l| l.as_ref().split_whitespace())
        .filter(|w| seen.insert(*w))
        .map(String::from)
        .collect();
    rank_by_similarity(goal, words, top_n)
}

/// Decorate `semantics` with surreal elements, more of them the higher its entropy.
pub fn entropy_twist<R: Rng + ?Sized>(semantics: &str, elements: &[&str], rng: &mut R) -> String {
    let scale = ((shannon_entropy(semantics) * 2.0).floor() as usize).min(elements.len());
    let mut shuffled = elements.to_vec();
    shuffled.shuffle(rng);
    let twist = shuffled[..scale].join(", ");
    format!("{semantics}. Entropy swelled: {twist}.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_shannon_entropy() {
        assert_eq!(shannon_entropy(""), 0.0);
        assert_eq!(shannon_entropy("aaaa"), 0.0);
        assert!((shannon_entropy("ab") - 1.0).abs() < 1e-12);
        assert!((shannon_entropy("abcd") - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("A dream, of U/D-transforms at 3am!"),
            vec!["dream", "of", "transforms", "at", "3am"]
        );
    }

    #[test]
    fn test_tfidf_vectors_are_normalized() {
        let model = TfIdf::fit(&["dream entropy", "entropy of memory", "memory"]);
        assert_eq!(model.vocabulary_len(), 4);

        let v = model.transform("dream dream entropy");
        let norm: f64 = v.values().map(|w| w * w).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);
        assert!(v["dream"] > v["entropy"]);
        assert!(model.transform("unseen words").is_empty());
    }

    #[test]
    fn test_cosine_similarity() {
        let model = TfIdf::fit(&["rain memory", "rain", "stars"]);
        let a = model.transform("rain memory");
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&a, &model.transform("stars")), 0.0);
        assert_eq!(cosine_similarity(&a, &SparseVector::new()), 0.0);
    }

    #[test]
    fn test_rank_relevant_lines() {
        let text = "Clouds drift without purpose.\n\n  Entropy folds memory into dreams.  \nA cat sleeps.";
        let ranked = rank_relevant_lines("memory and entropy", text, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0], "Entropy folds memory into dreams.");
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let ranked = rank_relevant_lines("zebra", "first line\nsecond line\nthird line", 5);
        assert_eq!(ranked, vec!["first line", "second line", "third line"]);
        assert!(rank_relevant_lines("zebra", "   \n", 5).is_empty());
        assert!(rank_relevant_lines("zebra", "line", 0).is_empty());
    }

    #[test]
    fn test_relevant_terms() {
        let lines = ["echoes of rain", "rain on stars", "echoes"];
        let terms = relevant_terms("rain", &lines, 2);
        assert_eq!(terms[0], "rain");
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn test_entropy_twist_scales_with_entropy() {
        let mut rng = StdRng::seed_from_u64(11);

        let flat = entropy_twist("aaaa", &SURREAL_ELEMENTS, &mut rng);
        assert_eq!(flat, "aaaa. Entropy swelled: .");

        // "ab" has one bit of entropy, so two elements are mixed in.
        let twisted = entropy_twist("ab", &SURREAL_ELEMENTS, &mut rng);
        let twist = twisted
            .strip_prefix("ab. Entropy swelled: ")
            .and_then(|t| t.strip_suffix('.'))
            .unwrap_or_default();
        assert_eq!(twist.split(", ").count(), 2);
        assert!(twist.split(", ").all(|e| SURREAL_ELEMENTS.contains(&e)));

        // High entropy is capped by the number of elements.
        let capped = entropy_twist("a rich sentence of many letters", &["fog"], &mut rng);
        assert_eq!(capped, "a rich sentence of many letters. Entropy swelled: fog.");
    }
}
