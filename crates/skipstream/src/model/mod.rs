//! # Model
//!
//! [`Model`] owns every training component and is the primary entry
//! point: configure a [`ModelOptions`], call
//! [`init`](ModelOptions::init), then feed sentences to
//! [`train_sentence`](Model::train_sentence).
//!
//! ```rust
//! use skipstream::model::{ModelOptions, LanguageModelOptions};
//! use skipstream::SkResult;
//!
//! fn main() -> SkResult<()> {
//!     let mut model = ModelOptions::default()
//!         .with_vocab_dim(64)
//!         .with_embedding_dim(16)
//!         .with_language_model(LanguageModelOptions::Naive {
//!             subsample_threshold: 1.0,
//!         })
//!         .with_seed(7)
//!         .init()?;
//!
//!     for _ in 0..10 {
//!         model.train_sentence(&["the", "cat", "sat", "on", "the", "mat"]);
//!     }
//!
//!     let similarity = model.similarity("cat", "mat")?;
//!     assert!(similarity.abs() <= 1.0);
//!     Ok(())
//! }
//! ```

mod options;

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[doc(inline)]
pub use options::{
    ContextOptions, LanguageModelOptions, ModelOptions, SamplingOptions, DEFAULT_EMBEDDING_DIM,
    DEFAULT_VOCAB_DIM,
};

use crate::errors::{SkResult, SkipstreamError};
use crate::math::{CountNormalizer, ReservoirSampler};
use crate::rng::{seeded_rng, ModelRng};
use crate::sampling::{EmpiricalSampling, SamplingStrategy};
use crate::train::{
    ContextStrategy, Sgd, SgnsSentenceLearner, SgnsTokenLearner, SubsamplingSgnsSentenceLearner,
    TrainView, WordContextFactorization,
};
use crate::vocab::{LanguageModel, NaiveLanguageModel, SpaceSavingLanguageModel};

/// An SGNS streaming embedding model.
///
/// Owns the vocabulary counter, both embedding matrices, the
/// negative-sampling strategy, the SGD schedule, the context strategy,
/// the learners, and the RNG. All training mutation flows through
/// [`train_sentence`](Self::train_sentence) on a single thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    options: ModelOptions,
    language_model: LanguageModel,
    factorization: WordContextFactorization,
    sampler: SamplingStrategy,
    sgd: Sgd,
    context_strategy: ContextStrategy,
    learner: SubsamplingSgnsSentenceLearner,
    rng: ModelRng,
}

impl Model {
    /// Build a model from options.
    ///
    /// Fails with [`SkipstreamError::CapacityExhausted`] when a
    /// dimension or capacity is zero.
    pub fn new(options: ModelOptions) -> SkResult<Self> {
        validate(&options)?;

        let mut rng = seeded_rng(options.seed);
        let factorization =
            WordContextFactorization::new(options.vocab_dim, options.embedding_dim, &mut rng);

        let language_model = match options.language_model {
            LanguageModelOptions::Naive {
                subsample_threshold,
            } => LanguageModel::Naive(NaiveLanguageModel::new(subsample_threshold)),
            LanguageModelOptions::SpaceSaving {
                subsample_threshold,
            } => LanguageModel::SpaceSaving(SpaceSavingLanguageModel::new(
                options.vocab_dim,
                subsample_threshold,
            )?),
        };

        let sampler = match options.neg_sampling {
            SamplingOptions::Uniform => SamplingStrategy::Uniform,
            SamplingOptions::Empirical {
                refresh_interval,
                refresh_burn_in,
                normalizer_exponent,
                normalizer_offset,
            } => SamplingStrategy::Empirical(EmpiricalSampling::new(
                CountNormalizer::new(normalizer_exponent, normalizer_offset),
                refresh_interval,
                refresh_burn_in,
            )),
            SamplingOptions::Reservoir { capacity } => {
                SamplingStrategy::Reservoir(ReservoirSampler::new(capacity)?)
            }
        };

        let sgd = options.sgd.init(options.vocab_dim);

        let context_strategy = match options.context {
            ContextOptions::Static { width } => ContextStrategy::Static { width },
            ContextOptions::Dynamic { width } => ContextStrategy::Dynamic { width },
        };

        let learner = SubsamplingSgnsSentenceLearner::new(
            options.propagate_discarded,
            SgnsSentenceLearner::new(options.neg_samples, options.propagate_retained),
        );

        info!(
            vocab_dim = options.vocab_dim,
            embedding_dim = options.embedding_dim,
            neg_samples = options.neg_samples,
            "initialized model"
        );

        Ok(Self {
            options,
            language_model,
            factorization,
            sampler,
            sgd,
            context_strategy,
            learner,
            rng,
        })
    }

    /// The options the model was built with.
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// The vocabulary counter.
    pub fn language_model(&self) -> &LanguageModel {
        &self.language_model
    }

    /// The embedding matrices.
    pub fn factorization(&self) -> &WordContextFactorization {
        &self.factorization
    }

    /// The SGD schedule.
    pub fn sgd(&self) -> &Sgd {
        &self.sgd
    }

    /// The negative-sampling strategy.
    pub fn sampler(&self) -> &SamplingStrategy {
        &self.sampler
    }

    /// Train on one tokenized sentence.
    ///
    /// This is the primary driver: it subsamples frequent words, counts
    /// tokens (discovering evictions and resetting recycled rows), and
    /// runs SGNS updates over every in-window (target, context) pair.
    #[tracing::instrument(level = "trace", skip_all, fields(len = words.len()))]
    pub fn train_sentence<S: AsRef<str>>(
        &mut self,
        words: &[S],
    ) {
        let mut view = TrainView {
            language_model: &mut self.language_model,
            factorization: &mut self.factorization,
            sampler: &mut self.sampler,
            sgd: &mut self.sgd,
            context_strategy: &self.context_strategy,
            rng: &mut self.rng,
        };
        self.learner.sentence_train(&mut view, words);
    }

    /// Force the negative-sampling strategy to recompute from current
    /// counts.
    ///
    /// A degenerate distribution under empirical sampling is fatal and
    /// surfaced here; see [`SamplingStrategy::reset`].
    pub fn reset_sampler(
        &mut self,
        normalizer: &CountNormalizer,
    ) -> SkResult<()> {
        self.sampler
            .reset(&self.language_model, normalizer, &mut self.rng)
    }

    /// Cosine similarity between the target embeddings of two words.
    pub fn similarity(
        &self,
        word1: &str,
        word2: &str,
    ) -> SkResult<f32> {
        let index1 = self.require(word1)?;
        let index2 = self.require(word2)?;
        Ok(SgnsTokenLearner::compute_similarity(
            &self.factorization,
            index1,
            index2,
        ))
    }

    /// The tracked word most similar to `word`, if any other word is
    /// tracked.
    pub fn nearest(
        &self,
        word: &str,
    ) -> SkResult<Option<String>> {
        let index = self.require(word)?;
        let nearest = SgnsTokenLearner::find_nearest_neighbor_idx(
            &self.factorization,
            self.language_model.size(),
            index,
        );
        match nearest {
            Some(found) => Ok(Some(self.language_model.reverse_lookup(found)?.to_string())),
            None => Ok(None),
        }
    }

    /// The tracked word whose target embedding best agrees with the
    /// given context words (untracked context words are skipped).
    pub fn context_nearest<S: AsRef<str>>(
        &self,
        context: &[S],
    ) -> SkResult<Option<String>> {
        let ids: Vec<i64> = context
            .iter()
            .map(|word| {
                self.language_model
                    .lookup(word.as_ref())
                    .map_or(-1, |index| index as i64)
            })
            .collect();
        let best = SgnsTokenLearner::find_context_nearest_neighbor_idx(
            &self.factorization,
            self.language_model.size(),
            &ids,
        );
        match best {
            Some(found) => Ok(Some(self.language_model.reverse_lookup(found)?.to_string())),
            None => Ok(None),
        }
    }

    /// Serialize the whole model (vocabulary, matrices, sampler and RNG
    /// phase, SGD state, hyperparameters) into `writer`.
    ///
    /// Loading the snapshot resumes training exactly where it left off.
    pub fn save<W: Write>(
        &self,
        writer: W,
    ) -> SkResult<()> {
        bincode::serialize_into(writer, self)
            .map_err(|e| SkipstreamError::Snapshot(e.to_string()))?;
        debug!(
            vocab = self.language_model.size(),
            total = self.language_model.total(),
            "saved model snapshot"
        );
        Ok(())
    }

    /// Deserialize a model previously written by [`save`](Self::save).
    pub fn load<R: Read>(reader: R) -> SkResult<Self> {
        let model: Self = bincode::deserialize_from(reader)
            .map_err(|e| SkipstreamError::Snapshot(e.to_string()))?;
        debug!(
            vocab = model.language_model.size(),
            total = model.language_model.total(),
            "loaded model snapshot"
        );
        Ok(model)
    }

    fn require(
        &self,
        word: &str,
    ) -> SkResult<usize> {
        self.language_model
            .lookup(word)
            .ok_or_else(|| SkipstreamError::UnknownWord {
                word: word.to_string(),
            })
    }
}

fn validate(options: &ModelOptions) -> SkResult<()> {
    if options.vocab_dim == 0 {
        return Err(SkipstreamError::CapacityExhausted(
            "vocab_dim must be nonzero".into(),
        ));
    }
    if options.embedding_dim == 0 {
        return Err(SkipstreamError::CapacityExhausted(
            "embedding_dim must be nonzero".into(),
        ));
    }
    if options.neg_samples == 0 {
        return Err(SkipstreamError::CapacityExhausted(
            "neg_samples must be nonzero".into(),
        ));
    }
    let width = match options.context {
        ContextOptions::Static { width } | ContextOptions::Dynamic { width } => width,
    };
    if width == 0 {
        return Err(SkipstreamError::CapacityExhausted(
            "context width must be nonzero".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_options() -> ModelOptions {
        ModelOptions::default()
            .with_vocab_dim(16)
            .with_embedding_dim(8)
            .with_language_model(LanguageModelOptions::Naive {
                subsample_threshold: 1.0,
            })
            .with_context(ContextOptions::Static { width: 2 })
            .with_neg_samples(2)
            .with_seed(5)
    }

    #[test]
    fn test_zero_dimensions_are_rejected() {
        assert!(small_options().with_vocab_dim(0).init().is_err());
        assert!(small_options().with_embedding_dim(0).init().is_err());
        assert!(small_options().with_neg_samples(0).init().is_err());
        assert!(small_options()
            .with_context(ContextOptions::Dynamic { width: 0 })
            .init()
            .is_err());
    }

    #[test]
    fn test_similarity_requires_tracked_words() {
        let mut model = small_options().init().unwrap();
        model.train_sentence(&["a", "b", "c"]);
        assert!(model.similarity("a", "b").is_ok());
        assert!(matches!(
            model.similarity("a", "zzz"),
            Err(SkipstreamError::UnknownWord { .. })
        ));
    }

    #[test]
    fn test_nearest_returns_a_tracked_word() {
        let mut model = small_options().init().unwrap();
        for _ in 0..5 {
            model.train_sentence(&["a", "b", "c"]);
        }
        let nearest = model.nearest("a").unwrap().unwrap();
        assert!(nearest == "b" || nearest == "c");
        assert!(model.nearest("zzz").is_err());
    }

    #[test]
    fn test_identical_seeds_train_identically() {
        let mut m1 = small_options().init().unwrap();
        let mut m2 = small_options().init().unwrap();
        for _ in 0..10 {
            m1.train_sentence(&["a", "b", "c", "d"]);
            m2.train_sentence(&["a", "b", "c", "d"]);
        }
        assert_eq!(m1.factorization(), m2.factorization());
        assert!((m1.similarity("a", "b").unwrap() - m2.similarity("a", "b").unwrap()).abs() == 0.0);
    }

    #[test]
    fn test_context_nearest_skips_unknown_words() {
        let mut model = small_options().init().unwrap();
        for _ in 0..5 {
            model.train_sentence(&["a", "b", "c"]);
        }
        assert!(model.context_nearest(&["b", "zzz"]).unwrap().is_some());
        assert_eq!(model.context_nearest(&["zzz"]).unwrap(), None);
    }
}
