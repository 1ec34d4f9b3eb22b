//! # Model Options

use serde::{Deserialize, Serialize};

use crate::sampling::{DEFAULT_REFRESH_BURN_IN, DEFAULT_REFRESH_INTERVAL, DEFAULT_RESERVOIR_CAPACITY};
use crate::train::{SgdOptions, DEFAULT_CONTEXT_WIDTH};
use crate::vocab::DEFAULT_SUBSAMPLE_THRESHOLD;

/// Default vocabulary dimension (counter capacity and matrix rows).
pub const DEFAULT_VOCAB_DIM: usize = 16_000;

/// Default embedding dimension.
pub const DEFAULT_EMBEDDING_DIM: usize = 200;

/// Which vocabulary counter a model uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LanguageModelOptions {
    /// Exact unbounded counting.
    Naive {
        /// Frequent-word subsampling threshold.
        subsample_threshold: f32,
    },
    /// Bounded approximate counting with eviction; capacity is the
    /// model's `vocab_dim`.
    SpaceSaving {
        /// Frequent-word subsampling threshold.
        subsample_threshold: f32,
    },
}

impl Default for LanguageModelOptions {
    fn default() -> Self {
        Self::SpaceSaving {
            subsample_threshold: DEFAULT_SUBSAMPLE_THRESHOLD,
        }
    }
}

/// Which negative-sampling strategy a model uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SamplingOptions {
    /// Uniform over live indices.
    Uniform,
    /// Alias-table draws from normalized counts.
    Empirical {
        /// Steps between table rebuilds after burn-in.
        refresh_interval: u64,
        /// Steps during which every step rebuilds.
        refresh_burn_in: u64,
        /// Count-distortion exponent.
        normalizer_exponent: f32,
        /// Additive count smoothing.
        normalizer_offset: f32,
    },
    /// Uniform draws from a reservoir of observed indices.
    Reservoir {
        /// Reservoir capacity.
        capacity: usize,
    },
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::Uniform
    }
}

impl SamplingOptions {
    /// Empirical sampling with the stock refresh schedule and
    /// normalizer.
    pub fn empirical() -> Self {
        Self::Empirical {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            refresh_burn_in: DEFAULT_REFRESH_BURN_IN,
            normalizer_exponent: crate::math::DEFAULT_NORMALIZER_EXPONENT,
            normalizer_offset: crate::math::DEFAULT_NORMALIZER_OFFSET,
        }
    }

    /// Reservoir sampling with the stock capacity.
    pub fn reservoir() -> Self {
        Self::Reservoir {
            capacity: DEFAULT_RESERVOIR_CAPACITY,
        }
    }
}

/// Which context-window strategy a model uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextOptions {
    /// Fixed symmetric width.
    Static {
        /// Symmetric context width.
        width: usize,
    },
    /// Width sampled uniformly from `1..=width` per target.
    Dynamic {
        /// Maximum symmetric context width.
        width: usize,
    },
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::Dynamic {
            width: DEFAULT_CONTEXT_WIDTH,
        }
    }
}

/// Options for [`crate::model::Model`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Vocabulary dimension: counter capacity (space-saving) and
    /// embedding matrix rows.
    pub vocab_dim: usize,
    /// Embedding dimension.
    pub embedding_dim: usize,
    /// Vocabulary counter choice.
    pub language_model: LanguageModelOptions,
    /// Negative-sampling strategy choice.
    pub neg_sampling: SamplingOptions,
    /// Context-window strategy choice.
    pub context: ContextOptions,
    /// SGD schedule parameters.
    pub sgd: SgdOptions,
    /// Negative samples per trained (target, context) pair.
    pub neg_samples: usize,
    /// Whether tokens first observed in a call train immediately.
    pub propagate_retained: bool,
    /// Whether subsample-discarded tokens are still counted.
    pub propagate_discarded: bool,
    /// RNG seed; falls back to the environment, then entropy.
    pub seed: Option<u64>,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            vocab_dim: DEFAULT_VOCAB_DIM,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            language_model: LanguageModelOptions::default(),
            neg_sampling: SamplingOptions::default(),
            context: ContextOptions::default(),
            sgd: SgdOptions::default(),
            neg_samples: crate::train::DEFAULT_NEG_SAMPLES,
            propagate_retained: true,
            propagate_discarded: true,
            seed: None,
        }
    }
}

impl ModelOptions {
    /// Set the vocabulary dimension.
    pub fn with_vocab_dim(
        self,
        vocab_dim: usize,
    ) -> Self {
        Self { vocab_dim, ..self }
    }

    /// Set the embedding dimension.
    pub fn with_embedding_dim(
        self,
        embedding_dim: usize,
    ) -> Self {
        Self {
            embedding_dim,
            ..self
        }
    }

    /// Set the vocabulary counter choice.
    pub fn with_language_model(
        self,
        language_model: LanguageModelOptions,
    ) -> Self {
        Self {
            language_model,
            ..self
        }
    }

    /// Set the negative-sampling strategy choice.
    pub fn with_neg_sampling(
        self,
        neg_sampling: SamplingOptions,
    ) -> Self {
        Self {
            neg_sampling,
            ..self
        }
    }

    /// Set the context-window strategy choice.
    pub fn with_context(
        self,
        context: ContextOptions,
    ) -> Self {
        Self { context, ..self }
    }

    /// Set the SGD schedule parameters.
    pub fn with_sgd(
        self,
        sgd: SgdOptions,
    ) -> Self {
        Self { sgd, ..self }
    }

    /// Set the negative samples per trained pair.
    pub fn with_neg_samples(
        self,
        neg_samples: usize,
    ) -> Self {
        Self {
            neg_samples,
            ..self
        }
    }

    /// Set whether first-observed tokens train immediately.
    pub fn with_propagate_retained(
        self,
        propagate_retained: bool,
    ) -> Self {
        Self {
            propagate_retained,
            ..self
        }
    }

    /// Set whether subsample-discarded tokens are still counted.
    pub fn with_propagate_discarded(
        self,
        propagate_discarded: bool,
    ) -> Self {
        Self {
            propagate_discarded,
            ..self
        }
    }

    /// Set the RNG seed.
    pub fn with_seed(
        self,
        seed: u64,
    ) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Initialize a [`crate::model::Model`] from these options.
    pub fn init(self) -> crate::errors::SkResult<crate::model::Model> {
        crate::model::Model::new(self)
    }
}
