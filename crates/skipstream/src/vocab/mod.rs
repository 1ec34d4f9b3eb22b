//! # Streaming Vocabulary
//!
//! Two interchangeable streaming word counters:
//!
//! * [`NaiveLanguageModel`] - exact counts, unbounded vocabulary; the
//!   external index of a word never changes.
//! * [`SpaceSavingLanguageModel`] - bounded approximate top-k counts;
//!   when the table is full, the minimum-count entry is evicted and its
//!   external index is recycled for the incoming word.
//!
//! Both distinguish *external* indices (the identity the embedding
//! matrices and samplers see) from storage order; the naive model
//! collapses the two. [`LanguageModel`] is the closed dispatch enum over
//! both.
//!
//! Eviction is reported to the caller as an [`EvictedWord`]; consumers
//! holding per-index state (embedding rows, per-row SGD counters) must
//! reset the recycled index before training on it.

mod naive_model;
mod space_saving_model;

use rand::Rng;
use serde::{Deserialize, Serialize};

#[doc(inline)]
pub use naive_model::NaiveLanguageModel;
#[doc(inline)]
pub use space_saving_model::SpaceSavingLanguageModel;

use crate::errors::SkResult;
use crate::types::WordKey;

/// Frequent-word subsampling threshold, as defined in word2vec.
pub const DEFAULT_SUBSAMPLE_THRESHOLD: f32 = 1e-3;

/// A word displaced from a bounded vocabulary, with its recycled
/// external index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvictedWord {
    /// The external index being recycled for the incoming word.
    pub index: usize,
    /// The word that lost the index.
    pub word: WordKey,
}

/// Closed dispatch over the two streaming counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LanguageModel {
    /// Exact, unbounded counting.
    Naive(NaiveLanguageModel),
    /// Bounded approximate top-k counting.
    SpaceSaving(SpaceSavingLanguageModel),
}

impl LanguageModel {
    /// Count one occurrence of `word`, tracking it if needed.
    ///
    /// Returns the eviction this caused, if any.
    pub fn increment(
        &mut self,
        word: &str,
    ) -> Option<EvictedWord> {
        match self {
            Self::Naive(lm) => lm.increment(word),
            Self::SpaceSaving(lm) => lm.increment(word),
        }
    }

    /// The external index of `word`, if tracked.
    pub fn lookup(
        &self,
        word: &str,
    ) -> Option<usize> {
        match self {
            Self::Naive(lm) => lm.lookup(word),
            Self::SpaceSaving(lm) => lm.lookup(word),
        }
    }

    /// The word at external index `index`.
    pub fn reverse_lookup(
        &self,
        index: usize,
    ) -> SkResult<&str> {
        match self {
            Self::Naive(lm) => lm.reverse_lookup(index),
            Self::SpaceSaving(lm) => lm.reverse_lookup(index),
        }
    }

    /// The count at external index `index`.
    pub fn count(
        &self,
        index: usize,
    ) -> SkResult<u64> {
        match self {
            Self::Naive(lm) => lm.count(index),
            Self::SpaceSaving(lm) => lm.count(index),
        }
    }

    /// Counts of all live external indices, indexed by external index.
    pub fn counts(&self) -> Vec<u64> {
        match self {
            Self::Naive(lm) => lm.counts(),
            Self::SpaceSaving(lm) => lm.counts(),
        }
    }

    /// Counts of all live external indices, descending.
    pub fn ordered_counts(&self) -> Vec<u64> {
        match self {
            Self::Naive(lm) => lm.ordered_counts(),
            Self::SpaceSaving(lm) => lm.ordered_counts(),
        }
    }

    /// Number of tracked word types.
    pub fn size(&self) -> usize {
        match self {
            Self::Naive(lm) => lm.size(),
            Self::SpaceSaving(lm) => lm.size(),
        }
    }

    /// Maximum number of tracked word types, if bounded.
    pub fn capacity(&self) -> Option<usize> {
        match self {
            Self::Naive(_) => None,
            Self::SpaceSaving(lm) => Some(lm.capacity()),
        }
    }

    /// Total number of tokens counted.
    pub fn total(&self) -> u64 {
        match self {
            Self::Naive(lm) => lm.total(),
            Self::SpaceSaving(lm) => lm.total(),
        }
    }

    /// Frequent-word subsampling draw for external index `index`.
    ///
    /// Keeps the word with probability `min(1, sqrt(threshold / f))`
    /// where `f` is the word's relative frequency.
    pub fn subsample<R: Rng>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> bool {
        match self {
            Self::Naive(lm) => lm.subsample(index, rng),
            Self::SpaceSaving(lm) => lm.subsample(index, rng),
        }
    }

    /// Retain the `max_size` highest-count words and renumber external
    /// indices densely in descending count order.
    pub fn truncate(
        &mut self,
        max_size: usize,
    ) {
        match self {
            Self::Naive(lm) => lm.truncate(max_size),
            Self::SpaceSaving(lm) => lm.truncate(max_size),
        }
    }
}

pub(crate) fn subsample_draw<R: Rng>(
    threshold: f32,
    count: u64,
    total: u64,
    rng: &mut R,
) -> bool {
    if total == 0 || count == 0 {
        return true;
    }
    let frequency = count as f64 / total as f64;
    let threshold = threshold as f64;
    if frequency <= threshold {
        return true;
    }
    rng.gen::<f64>() < (threshold / frequency).sqrt()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_rare_words_are_always_kept() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..100 {
            assert!(subsample_draw(1e-3, 1, 10_000, &mut rng));
        }
    }

    // Structural invariant proptests

    mod invariants {
        use proptest::prelude::*;

        use super::super::*;
        use crate::types::CommonHashMap;

        fn word(index: u8) -> String {
            format!("w{index}")
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            // Sum of per-index counts always equals the token total, for
            // both counters, on any stream.
            #[test]
            fn count_conservation(
                stream in proptest::collection::vec(0..12u8, 0..200),
                capacity in 1..8usize,
            ) {
                let mut naive = NaiveLanguageModel::new(1e-3);
                let mut bounded =
                    SpaceSavingLanguageModel::new(capacity, 1e-3).unwrap();
                for index in &stream {
                    naive.increment(&word(*index));
                    bounded.increment(&word(*index));
                }
                prop_assert_eq!(
                    naive.counts().iter().sum::<u64>(),
                    naive.total()
                );
                prop_assert_eq!(
                    bounded.counts().iter().sum::<u64>(),
                    bounded.total()
                );
                prop_assert_eq!(naive.total(), stream.len() as u64);
            }

            // Space-saving approximation bound: for every tracked word,
            // true <= approx <= true + floor(total / capacity).
            #[test]
            fn space_saving_bound(
                stream in proptest::collection::vec(0..12u8, 1..300),
                capacity in 1..8usize,
            ) {
                let mut bounded =
                    SpaceSavingLanguageModel::new(capacity, 1e-3).unwrap();
                let mut truth: CommonHashMap<String, u64> = CommonHashMap::new();
                for index in &stream {
                    let w = word(*index);
                    *truth.entry(w.clone()).or_default() += 1;
                    bounded.increment(&w);
                }
                let slack = bounded.total() / capacity as u64;
                for (index, approx) in bounded.counts().into_iter().enumerate() {
                    let tracked = bounded.reverse_lookup(index).unwrap();
                    let exact = truth[tracked];
                    prop_assert!(exact <= approx);
                    prop_assert!(approx <= exact + slack);
                }
            }

            // A tracked word maps back to exactly its own index.
            #[test]
            fn lookup_reverse_lookup_agree(
                stream in proptest::collection::vec(0..12u8, 1..200),
                capacity in 1..8usize,
            ) {
                let mut bounded =
                    SpaceSavingLanguageModel::new(capacity, 1e-3).unwrap();
                for index in &stream {
                    bounded.increment(&word(*index));
                }
                for index in 0..bounded.size() {
                    let w = bounded.reverse_lookup(index).unwrap().to_string();
                    prop_assert_eq!(bounded.lookup(&w), Some(index));
                }
            }
        }
    }

    // P(keep) converges on min(1, sqrt(threshold / f)).
    #[test]
    fn test_subsample_law() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let threshold = 1e-3f32;
        let count = 2_000u64;
        let total = 10_000u64;
        let expected = (threshold as f64 / 0.2).sqrt();

        let n = 100_000u32;
        let mut kept = 0u32;
        for _ in 0..n {
            if subsample_draw(threshold, count, total, &mut rng) {
                kept += 1;
            }
        }
        let sigma = (n as f64 * expected * (1.0 - expected)).sqrt();
        let delta = (kept as f64 - expected * n as f64).abs();
        assert!(delta <= 3.0 * sigma, "|{kept} - {}| > 3 * {sigma}", expected * n as f64);
    }
}
