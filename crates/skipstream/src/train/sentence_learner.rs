//! # Sentence Learners
//!
//! [`SgnsSentenceLearner`] drives the token learner across the
//! overlapping contexts of one sentence. [`SubsamplingSgnsSentenceLearner`]
//! wraps it with word2vec frequent-word subsampling.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::train::{SgnsTokenLearner, TrainView};

/// Default number of negative samples per (target, context) pair.
pub const DEFAULT_NEG_SAMPLES: usize = 5;

/// Trains over sentences: counts tokens, sizes context windows, and
/// feeds every (target, context) pair to the token learner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SgnsSentenceLearner {
    neg_samples: usize,
    propagate_retained: bool,
    token_learner: SgnsTokenLearner,
}

impl SgnsSentenceLearner {
    /// Create a sentence learner.
    ///
    /// ## Arguments
    /// * `neg_samples` - negative samples per trained pair.
    /// * `propagate_retained` - when true, tokens first observed during
    ///   the current call train immediately; when false they record as
    ///   out-of-vocabulary for this sentence and only train on later
    ///   sentences.
    pub fn new(
        neg_samples: usize,
        propagate_retained: bool,
    ) -> Self {
        Self {
            neg_samples,
            propagate_retained,
            token_learner: SgnsTokenLearner::new(),
        }
    }

    /// Negative samples per trained pair.
    pub fn neg_samples(&self) -> usize {
        self.neg_samples
    }

    /// Count one occurrence of `word`, resetting any evicted row before
    /// returning.
    ///
    /// Returns the word's external index after the increment.
    pub fn increment(
        &mut self,
        view: &mut TrainView<'_>,
        word: &str,
    ) -> Option<usize> {
        if let Some(evicted) = view.language_model.increment(word) {
            trace!(
                word,
                evicted = evicted.word.as_str(),
                index = evicted.index,
                "resetting recycled embedding row"
            );
            self.token_learner.reset_word(view, evicted.index);
        }
        view.language_model.lookup(word)
    }

    /// Count every token of `words`, then train on all in-window
    /// (target, context) pairs.
    pub fn sentence_train<S: AsRef<str>>(
        &mut self,
        view: &mut TrainView<'_>,
        words: &[S],
    ) {
        // Pass 1: count, and record each position's training identity.
        // With propagate_retained a token trains under its
        // post-increment index; without it the whole sentence trains
        // against the vocabulary as it stood before this call, so
        // first-observed tokens wait for a later sentence.
        let mut ids: Vec<i64> = Vec::with_capacity(words.len());
        if self.propagate_retained {
            for word in words {
                let after = self.increment(view, word.as_ref());
                ids.push(after.map_or(-1, |index| index as i64));
            }
        } else {
            for word in words {
                let before = view.language_model.lookup(word.as_ref());
                ids.push(before.map_or(-1, |index| index as i64));
            }
            for word in words {
                self.increment(view, word.as_ref());
            }
        }

        // Pass 2: iterate contexts.
        let len = ids.len();
        for position in 0..len {
            let target = ids[position];
            if target < 0 {
                continue;
            }
            let (left, right) =
                view.context_strategy
                    .size(position, len - 1 - position, view.rng);
            for neighbor in (position - left)..=(position + right) {
                if neighbor == position {
                    continue;
                }
                let context = ids[neighbor];
                if context < 0 {
                    continue;
                }
                self.token_learner.token_train(
                    view,
                    target as usize,
                    context as usize,
                    self.neg_samples,
                );
                view.sampler
                    .step(view.language_model, context as usize, view.rng);
            }
        }
    }
}

/// Frequent-word subsampling in front of a [`SgnsSentenceLearner`].
///
/// Tracked words are kept with probability `min(1, sqrt(threshold / f))`
/// (the word2vec law); untracked words always pass through so they can
/// enter the vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsamplingSgnsSentenceLearner {
    propagate_discarded: bool,
    sentence_learner: SgnsSentenceLearner,
}

impl SubsamplingSgnsSentenceLearner {
    /// Create a subsampling wrapper.
    ///
    /// ## Arguments
    /// * `propagate_discarded` - when true, dropped words are still
    ///   counted so vocabulary statistics keep accumulating.
    /// * `sentence_learner` - the wrapped learner.
    pub fn new(
        propagate_discarded: bool,
        sentence_learner: SgnsSentenceLearner,
    ) -> Self {
        Self {
            propagate_discarded,
            sentence_learner,
        }
    }

    /// The wrapped sentence learner.
    pub fn sentence_learner(&self) -> &SgnsSentenceLearner {
        &self.sentence_learner
    }

    /// Subsample `words` by frequency, then train on the survivors.
    pub fn sentence_train<S: AsRef<str>>(
        &mut self,
        view: &mut TrainView<'_>,
        words: &[S],
    ) {
        let mut retained: Vec<&str> = Vec::with_capacity(words.len());
        for word in words {
            let word = word.as_ref();
            let keep = match view.language_model.lookup(word) {
                Some(index) => view.language_model.subsample(index, view.rng),
                None => true,
            };
            if keep {
                retained.push(word);
            } else if self.propagate_discarded {
                self.sentence_learner.increment(view, word);
            }
        }
        self.sentence_learner.sentence_train(view, &retained);
    }
}
