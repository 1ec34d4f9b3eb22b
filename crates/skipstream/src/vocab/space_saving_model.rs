//! # Space-Saving Counter
//!
//! Bounded approximate top-k counting (Metwally, Agrawal, El Abbadi).
//! Counts are exact until the table fills; afterwards an untracked word
//! takes over the minimum-count slot, inheriting `min + 1` as its count.
//! The over-estimate of any tracked word is at most `total / capacity`.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::{SkResult, SkipstreamError};
use crate::types::{CommonHashMap, WordKey};
use crate::vocab::{subsample_draw, EvictedWord, DEFAULT_SUBSAMPLE_THRESHOLD};

/// Default counter capacity.
pub const DEFAULT_NUM_COUNTERS: usize = 16_000;

/// Bounded streaming counter with eviction and index recycling.
///
/// Two index spaces are maintained: *internal* slot indices order the
/// physical counter array, while *external* indices are the stable
/// identities handed to embedding matrices and samplers. When a full
/// table replaces its minimum entry, the incoming word inherits the
/// evicted word's external index; the caller is told via the returned
/// [`EvictedWord`] and must reset any per-index state it keeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(into = "SpaceSavingState", from = "SpaceSavingState")]
pub struct SpaceSavingLanguageModel {
    subsample_threshold: f32,
    num_counters: usize,
    total: u64,
    /// Internal slot holding the globally minimal count.
    min_idx: usize,
    /// Count per internal slot.
    counters: Vec<u64>,
    /// Word per internal slot.
    words: Vec<WordKey>,
    /// external index -> internal slot
    internal_ids: Vec<usize>,
    /// internal slot -> external index
    external_ids: Vec<usize>,
    word_ids: CommonHashMap<WordKey, usize>,
}

/// Serialized form: the word→index map is rebuilt on load so snapshot
/// bytes do not depend on hash-map iteration order.
#[derive(Serialize, Deserialize)]
struct SpaceSavingState {
    subsample_threshold: f32,
    num_counters: usize,
    total: u64,
    min_idx: usize,
    counters: Vec<u64>,
    words: Vec<WordKey>,
    internal_ids: Vec<usize>,
    external_ids: Vec<usize>,
}

impl From<SpaceSavingLanguageModel> for SpaceSavingState {
    fn from(lm: SpaceSavingLanguageModel) -> Self {
        Self {
            subsample_threshold: lm.subsample_threshold,
            num_counters: lm.num_counters,
            total: lm.total,
            min_idx: lm.min_idx,
            counters: lm.counters,
            words: lm.words,
            internal_ids: lm.internal_ids,
            external_ids: lm.external_ids,
        }
    }
}

impl From<SpaceSavingState> for SpaceSavingLanguageModel {
    fn from(state: SpaceSavingState) -> Self {
        let word_ids = state
            .words
            .iter()
            .zip(state.external_ids.iter())
            .map(|(word, &external)| (word.clone(), external))
            .collect();
        Self {
            subsample_threshold: state.subsample_threshold,
            num_counters: state.num_counters,
            total: state.total,
            min_idx: state.min_idx,
            counters: state.counters,
            words: state.words,
            internal_ids: state.internal_ids,
            external_ids: state.external_ids,
            word_ids,
        }
    }
}

impl Default for SpaceSavingLanguageModel {
    fn default() -> Self {
        Self::new(DEFAULT_NUM_COUNTERS, DEFAULT_SUBSAMPLE_THRESHOLD)
            .expect("default capacity is nonzero")
    }
}

impl SpaceSavingLanguageModel {
    /// Create an empty model.
    ///
    /// ## Arguments
    /// * `num_counters` - counter capacity; must be nonzero.
    /// * `subsample_threshold` - frequent-word subsampling threshold.
    pub fn new(
        num_counters: usize,
        subsample_threshold: f32,
    ) -> SkResult<Self> {
        if num_counters == 0 {
            return Err(SkipstreamError::CapacityExhausted(
                "space-saving capacity must be nonzero".into(),
            ));
        }
        Ok(Self {
            subsample_threshold,
            num_counters,
            total: 0,
            min_idx: 0,
            counters: Vec::new(),
            words: Vec::new(),
            internal_ids: Vec::new(),
            external_ids: Vec::new(),
            word_ids: CommonHashMap::with_capacity(num_counters),
        })
    }

    /// Count one occurrence of `word`.
    ///
    /// Returns the eviction this caused, if any; the evicted entry's
    /// external index now belongs to `word`.
    pub fn increment(
        &mut self,
        word: &str,
    ) -> Option<EvictedWord> {
        self.total += 1;
        if let Some(&external) = self.word_ids.get(word) {
            self.tracked_increment(external);
            None
        } else if self.counters.len() < self.num_counters {
            self.unfull_append(word);
            None
        } else {
            Some(self.full_replace(word))
        }
    }

    fn tracked_increment(
        &mut self,
        external: usize,
    ) {
        let internal = self.internal_ids[external];
        self.counters[internal] += 1;
        // The incremented slot may have been the minimum.
        if internal == self.min_idx {
            self.update_min_idx();
        }
    }

    fn unfull_append(
        &mut self,
        word: &str,
    ) {
        // While the table is unfull, empty slots count as zero-count
        // minima, so a new word enters with count 1.
        let internal = self.counters.len();
        self.counters.push(1);
        self.words.push(word.into());
        self.internal_ids.push(internal);
        self.external_ids.push(internal);
        self.word_ids.insert(word.into(), internal);
        // Keep the earliest slot on ties, matching the linear rescan.
        if internal == 0 || self.counters[self.min_idx] > 1 {
            self.min_idx = internal;
        }
    }

    fn full_replace(
        &mut self,
        word: &str,
    ) -> EvictedWord {
        let internal = self.min_idx;
        let external = self.external_ids[internal];
        let evicted = core::mem::replace(&mut self.words[internal], word.into());
        self.counters[internal] += 1;
        self.word_ids.remove(evicted.as_str());
        self.word_ids.insert(word.into(), external);
        self.update_min_idx();
        trace!(
            word,
            evicted = evicted.as_str(),
            index = external,
            "evicted min-count word"
        );
        EvictedWord {
            index: external,
            word: evicted,
        }
    }

    fn update_min_idx(&mut self) {
        let mut min_idx = 0;
        for (slot, &count) in self.counters.iter().enumerate() {
            if count < self.counters[min_idx] {
                min_idx = slot;
            }
        }
        self.min_idx = min_idx;
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
        self.internal_ids
            .get(index)
            .map(|&internal| self.words[internal].as_str())
            .ok_or(SkipstreamError::InvalidIndex {
                index: index as i64,
            })
    }

    /// The count at external index `index`.
    pub fn count(
        &self,
        index: usize,
    ) -> SkResult<u64> {
        self.internal_ids
            .get(index)
            .map(|&internal| self.counters[internal])
            .ok_or(SkipstreamError::InvalidIndex {
                index: index as i64,
            })
    }

    /// Counts of all tracked words, indexed by external index.
    pub fn counts(&self) -> Vec<u64> {
        self.internal_ids
            .iter()
            .map(|&internal| self.counters[internal])
            .collect()
    }

    /// Counts of all tracked words, descending.
    pub fn ordered_counts(&self) -> Vec<u64> {
        let mut counts = self.counters.clone();
        counts.sort_unstable_by(|a, b| b.cmp(a));
        counts
    }

    /// Number of tracked word types.
    pub fn size(&self) -> usize {
        self.counters.len()
    }

    /// Counter capacity.
    pub fn capacity(&self) -> usize {
        self.num_counters
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
        let count = self
            .internal_ids
            .get(index)
            .map(|&internal| self.counters[internal])
            .unwrap_or(0);
        subsample_draw(self.subsample_threshold, count, self.total, rng)
    }

    /// Retain the `max_size` highest-count words and renumber external
    /// indices densely in descending count order; internal and external
    /// index spaces coincide afterwards.
    pub fn truncate(
        &mut self,
        max_size: usize,
    ) {
        let mut order: Vec<usize> = (0..self.counters.len()).collect();
        order.sort_by(|&a, &b| {
            self.counters[b]
                .cmp(&self.counters[a])
                .then(self.external_ids[a].cmp(&self.external_ids[b]))
        });
        order.truncate(max_size);

        let mut counters = Vec::with_capacity(order.len());
        let mut words = Vec::with_capacity(order.len());
        let mut word_ids = CommonHashMap::with_capacity(order.len());
        let mut total = 0u64;
        for (new_index, &old_internal) in order.iter().enumerate() {
            counters.push(self.counters[old_internal]);
            words.push(self.words[old_internal].clone());
            word_ids.insert(self.words[old_internal].clone(), new_index);
            total += self.counters[old_internal];
        }
        let size = counters.len();
        self.counters = counters;
        self.words = words;
        self.word_ids = word_ids;
        self.internal_ids = (0..size).collect();
        self.external_ids = (0..size).collect();
        self.total = total;
        self.update_min_idx();
    }
}
