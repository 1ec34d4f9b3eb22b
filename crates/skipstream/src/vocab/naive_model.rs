//! # Exact Streaming Counter

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{SkResult, SkipstreamError};
use crate::types::{CommonHashMap, WordKey};
use crate::vocab::{subsample_draw, EvictedWord, DEFAULT_SUBSAMPLE_THRESHOLD};

/// Exact monotone word counter with dense external indices.
///
/// A new word is assigned the next free index and nothing is ever
/// evicted, so internal and external index spaces coincide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "NaiveState", from = "NaiveState")]
pub struct NaiveLanguageModel {
    subsample_threshold: f32,
    total: u64,
    counters: Vec<u64>,
    words: Vec<WordKey>,
    word_ids: CommonHashMap<WordKey, usize>,
}

/// Serialized form: the word→index map is rebuilt on load so snapshot
/// bytes do not depend on hash-map iteration order.
#[derive(Serialize, Deserialize)]
struct NaiveState {
    subsample_threshold: f32,
    total: u64,
    counters: Vec<u64>,
    words: Vec<WordKey>,
}

impl From<NaiveLanguageModel> for NaiveState {
    fn from(lm: NaiveLanguageModel) -> Self {
        Self {
            subsample_threshold: lm.subsample_threshold,
            total: lm.total,
            counters: lm.counters,
            words: lm.words,
        }
    }
}

impl From<NaiveState> for NaiveLanguageModel {
    fn from(state: NaiveState) -> Self {
        let word_ids = state
            .words
            .iter()
            .enumerate()
            .map(|(index, word)| (word.clone(), index))
            .collect();
        Self {
            subsample_threshold: state.subsample_threshold,
            total: state.total,
            counters: state.counters,
            words: state.words,
            word_ids,
        }
    }
}

impl Default for NaiveLanguageModel {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSAMPLE_THRESHOLD)
    }
}

impl NaiveLanguageModel {
    /// Create an empty model.
    ///
    /// ## Arguments
    /// * `subsample_threshold` - frequent-word subsampling threshold.
    pub fn new(subsample_threshold: f32) -> Self {
        Self {
            subsample_threshold,
            total: 0,
            counters: Vec::new(),
            words: Vec::new(),
            word_ids: CommonHashMap::new(),
        }
    }

    /// Count one occurrence of `word`; always returns `None` (nothing is
    /// ever evicted here).
    pub fn increment(
        &mut self,
        word: &str,
    ) -> Option<EvictedWord> {
        self.total += 1;
        match self.word_ids.get(word) {
            Some(&index) => {
                self.counters[index] += 1;
            }
            None => {
                let index = self.words.len();
                self.words.push(word.into());
                self.counters.push(1);
                self.word_ids.insert(word.into(), index);
            }
        }
        None
    }

    /// The external index of `word`, if tracked.
    pub fn lookup(
        &self,
        word: &str,
    ) -> Option<usize> {
        self.word_ids.get(word).copied()
    }

    /// The word at external index `index`.
    pub fn reverse_lookup(
        &self,
        index: usize,
    ) -> SkResult<&str> {
        self.words
            .get(index)
            .map(WordKey::as_str)
            .ok_or(SkipstreamError::InvalidIndex {
                index: index as i64,
            })
    }

    /// The count at external index `index`.
    pub fn count(
        &self,
        index: usize,
    ) -> SkResult<u64> {
        self.counters
            .get(index)
            .copied()
            .ok_or(SkipstreamError::InvalidIndex {
                index: index as i64,
            })
    }

    /// Counts of all words, indexed by external index.
    pub fn counts(&self) -> Vec<u64> {
        self.counters.clone()
    }

    /// Counts of all words, descending.
    pub fn ordered_counts(&self) -> Vec<u64> {
        let mut counts = self.counters.clone();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        counts
    }

    /// Number of tracked word types.
    pub fn size(&self) -> usize {
        self.words.len()
    }

    /// Total number of tokens counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Frequent-word subsampling draw; see [`crate::vocab::LanguageModel::subsample`].
    pub fn subsample<R: Rng>(
        &self,
        index: usize,
        rng: &mut R,
    ) -> bool {
        subsample_draw(
            self.subsample_threshold,
            self.counters.get(index).copied().unwrap_or(0),
            self.total,
            rng,
        )
    }

    /// Retain the `max_size` highest-count words (ties broken by prior
    /// insertion order) and renumber external indices densely into
    /// `[0, max_size)` in descending count order.
    pub fn truncate(
        &mut self,
        max_size: usize,
    ) {
        let order = self.descending_order();
        self.reorder(&order[..max_size.min(order.len())]);
    }

    /// Permute external indices into descending count order.
    pub fn sort(&mut self) {
        let order = self.descending_order();
        self.reorder(&order);
    }

    fn descending_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.counters.len()).collect();
        order.sort_by(|&a, &b| self.counters[b].cmp(&self.counters[a]).then(a.cmp(&b)));
        order
    }

    fn reorder(
        &mut self,
        kept: &[usize],
    ) {
        let mut counters = Vec::with_capacity(kept.len());
        let mut words = Vec::with_capacity(kept.len());
        let mut word_ids = CommonHashMap::with_capacity(kept.len());
        let mut total = 0u64;
        for (new_index, &old_index) in kept.iter().enumerate() {
            counters.push(self.counters[old_index]);
            words.push(self.words[old_index].clone());
            word_ids.insert(self.words[old_index].clone(), new_index);
            total += self.counters[old_index];
        }
        self.counters = counters;
        self.words = words;
        self.word_ids = word_ids;
        self.total = total;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn counted(samples: &[&str]) -> NaiveLanguageModel {
        let mut lm = NaiveLanguageModel::new(DEFAULT_SUBSAMPLE_THRESHOLD);
        for w in samples {
            assert_eq!(lm.increment(w), None);
        }
        lm
    }

    #[test]
    fn test_assigns_dense_indices_in_first_seen_order() {
        let lm = counted(&["b", "a", "b", "c"]);
        assert_eq!(lm.lookup("b"), Some(0));
        assert_eq!(lm.lookup("a"), Some(1));
        assert_eq!(lm.lookup("c"), Some(2));
        assert_eq!(lm.lookup("d"), None);
        assert_eq!(lm.reverse_lookup(0).unwrap(), "b");
        assert!(lm.reverse_lookup(3).is_err());
    }

    #[test]
    fn test_counts_and_total() {
        let lm = counted(&["a", "b", "a", "a", "c", "b"]);
        assert_eq!(lm.counts(), vec![3, 2, 1]);
        assert_eq!(lm.ordered_counts(), vec![3, 2, 1]);
        assert_eq!(lm.size(), 3);
        assert_eq!(lm.total(), 6);
        assert_eq!(lm.count(0).unwrap(), 3);
        assert!(lm.count(9).is_err());
    }

    #[test]
    fn test_count_conservation() {
        let lm = counted(&["x", "y", "x", "z", "z", "z", "y", "x"]);
        let sum: u64 = lm.counts().iter().sum();
        assert_eq!(sum, lm.total());
    }

    #[test]
    fn test_truncate_keeps_top_counts_with_insertion_ties() {
        let mut lm = counted(&["a", "b", "c", "b", "d", "c", "b"]);
        // counts: a=1 b=3 c=2 d=1
        lm.truncate(3);
        assert_eq!(lm.size(), 3);
        assert_eq!(lm.lookup("b"), Some(0));
        assert_eq!(lm.lookup("c"), Some(1));
        // "a" wins the a/d tie by insertion order.
        assert_eq!(lm.lookup("a"), Some(2));
        assert_eq!(lm.lookup("d"), None);
        assert_eq!(lm.counts(), vec![3, 2, 1]);
        assert_eq!(lm.total(), 6);
    }

    #[test]
    fn test_sort_orders_by_descending_count() {
        let mut lm = counted(&["a", "b", "b", "c", "c", "c"]);
        lm.sort();
        assert_eq!(lm.lookup("c"), Some(0));
        assert_eq!(lm.lookup("b"), Some(1));
        assert_eq!(lm.lookup("a"), Some(2));
        assert_eq!(lm.counts(), vec![3, 2, 1]);
        assert_eq!(lm.total(), 6);
    }

    #[test]
    fn test_subsample_keeps_rare_words_deterministically() {
        let mut lm = NaiveLanguageModel::new(0.5);
        for _ in 0..3 {
            lm.increment("common");
        }
        lm.increment("rare");
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        // f("rare") = 0.25 <= 0.5
        for _ in 0..50 {
            assert!(lm.subsample(1, &mut rng));
        }
    }
}
