//! # SGNS Training
//!
//! The training loop proper:
//!
//! * [`Sgd`] - per-row Robbins-Monro step schedule.
//! * [`ContextStrategy`] - static or sampled context window sizing.
//! * [`WordContextFactorization`] - paired target/context matrices.
//! * [`SgnsTokenLearner`] - one positive + k negative gradient steps.
//! * [`SgnsSentenceLearner`] - context iteration over a sentence.
//! * [`SubsamplingSgnsSentenceLearner`] - frequent-word filter on top.
//!
//! Learners do not own their collaborators; every call borrows a
//! [`TrainView`] of the model's components. This keeps ownership with
//! [`crate::model::Model`] and sidesteps the reference cycles an
//! object-graph design would need.

mod context_strategy;
mod factorization;
mod sentence_learner;
mod sgd;
mod token_learner;

#[doc(inline)]
pub use context_strategy::{ContextStrategy, DEFAULT_CONTEXT_WIDTH};
#[doc(inline)]
pub use factorization::WordContextFactorization;
#[doc(inline)]
pub use sentence_learner::{SgnsSentenceLearner, SubsamplingSgnsSentenceLearner, DEFAULT_NEG_SAMPLES};
#[doc(inline)]
pub use sgd::{Sgd, SgdOptions, DEFAULT_KAPPA, DEFAULT_RHO_LOWER_BOUND, DEFAULT_TAU};
#[doc(inline)]
pub use token_learner::SgnsTokenLearner;

use crate::rng::ModelRng;
use crate::sampling::SamplingStrategy;
use crate::vocab::LanguageModel;

/// Exclusive borrow of every model component a learner touches.
///
/// Built fresh per call by the owner; the fields are disjoint, so a
/// learner can mutate embeddings, SGD state, and sampler state while
/// reading the vocabulary.
#[derive(Debug)]
pub struct TrainView<'m> {
    /// The vocabulary counter.
    pub language_model: &'m mut LanguageModel,
    /// Target/context embedding matrices.
    pub factorization: &'m mut WordContextFactorization,
    /// Negative-sample source.
    pub sampler: &'m mut SamplingStrategy,
    /// Per-row step schedule.
    pub sgd: &'m mut Sgd,
    /// Context window sizing.
    pub context_strategy: &'m ContextStrategy,
    /// The model's random source.
    pub rng: &'m mut ModelRng,
}
