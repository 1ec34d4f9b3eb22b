//! # Token Learner
//!
//! One SGNS gradient step: a single (target, context) pair plus `k`
//! negative samples. Not usually called directly; see
//! [`super::SgnsSentenceLearner`].

use serde::{Deserialize, Serialize};

use crate::math::kernels::{axpy, cosine, dot, sigmoid};
use crate::train::{TrainView, WordContextFactorization};

/// Performs single-pair SGNS updates and embedding-space queries.
///
/// Stateless apart from a reusable gradient scratch buffer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SgnsTokenLearner {
    #[serde(skip)]
    gradient: Vec<f32>,
}

impl SgnsTokenLearner {
    /// Create a learner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Train on one (target, context) pair with `neg_samples` negative
    /// draws, then step the SGD schedule for both rows.
    ///
    /// Updates ascend the SGNS objective: the positive pair's dot
    /// product is pushed up, sampled negatives' down. Context rows are
    /// updated immediately; the target row accumulates all
    /// contributions and is updated once at the end. Negative draws may
    /// collide with the target; the collision is rare and harmless, so
    /// no rejection is done.
    pub fn token_train(
        &mut self,
        view: &mut TrainView<'_>,
        target: usize,
        context: usize,
        neg_samples: usize,
    ) {
        let dim = view.factorization.embedding_dim();
        self.gradient.clear();
        self.gradient.resize(dim, 0.0);

        // Positive pair.
        let coeff = gradient_coeff(view.factorization, target, context, false);
        axpy(
            -coeff,
            view.factorization.context_embedding(context),
            &mut self.gradient,
        );
        let (word_row, context_row) = view
            .factorization
            .word_and_context_rows_mut(target, context);
        view.sgd
            .scaled_gradient_update(context, word_row, context_row, -coeff);

        // Negative samples.
        for _ in 0..neg_samples {
            let negative = view.sampler.sample_idx(view.language_model, view.rng);
            let coeff = gradient_coeff(view.factorization, target, negative, true);
            axpy(
                -coeff,
                view.factorization.context_embedding(negative),
                &mut self.gradient,
            );
            let (word_row, context_row) = view
                .factorization
                .word_and_context_rows_mut(target, negative);
            view.sgd
                .scaled_gradient_update(negative, word_row, context_row, -coeff);
        }

        // Accumulated target update, then the schedule steps.
        view.sgd.gradient_update(
            target,
            &self.gradient,
            view.factorization.word_embedding_mut(target),
        );
        view.sgd.step(target);
        view.sgd.step(context);
    }

    /// Reinitialize a recycled row: fresh noise for the target
    /// embedding, zeros for the context embedding, restarted SGD
    /// schedule.
    pub fn reset_word(
        &self,
        view: &mut TrainView<'_>,
        row: usize,
    ) {
        view.factorization.randomize_word_row(row, view.rng);
        view.factorization.zero_context_row(row);
        view.sgd.reset(row);
    }

    /// Cosine similarity of two target embeddings.
    pub fn compute_similarity(
        factorization: &WordContextFactorization,
        word1: usize,
        word2: usize,
    ) -> f32 {
        cosine(
            factorization.word_embedding(word1),
            factorization.word_embedding(word2),
        )
    }

    /// The live index most similar to `word`, excluding `word` itself.
    ///
    /// Returns `None` when the vocabulary holds fewer than two words.
    pub fn find_nearest_neighbor_idx(
        factorization: &WordContextFactorization,
        vocab_size: usize,
        word: usize,
    ) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for candidate in 0..vocab_size {
            if candidate == word {
                continue;
            }
            let similarity = Self::compute_similarity(factorization, word, candidate);
            if best.map_or(true, |(_, score)| similarity > score) {
                best = Some((candidate, similarity));
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// The live index whose target embedding best agrees with the given
    /// context: argmax over `e` of the mean of
    /// `sigmoid(W[e] . C[ids[j]])` across context positions.
    ///
    /// Out-of-vocabulary positions (negative ids) are skipped; returns
    /// `None` when every position is out-of-vocabulary or the
    /// vocabulary is empty.
    pub fn find_context_nearest_neighbor_idx(
        factorization: &WordContextFactorization,
        vocab_size: usize,
        context_ids: &[i64],
    ) -> Option<usize> {
        let live: Vec<usize> = context_ids
            .iter()
            .filter(|id| **id >= 0)
            .map(|id| *id as usize)
            .collect();
        if live.is_empty() {
            return None;
        }

        let mut best: Option<(usize, f32)> = None;
        for candidate in 0..vocab_size {
            let word_row = factorization.word_embedding(candidate);
            let mut score = 0.0f32;
            for &context in &live {
                score += sigmoid(dot(word_row, factorization.context_embedding(context)));
            }
            score /= live.len() as f32;
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((candidate, score));
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// True iff any context position is out-of-vocabulary.
    pub fn context_contains_oov(context_ids: &[i64]) -> bool {
        context_ids.iter().any(|id| *id < 0)
    }
}

fn gradient_coeff(
    factorization: &WordContextFactorization,
    target: usize,
    context: usize,
    negative: bool,
) -> f32 {
    let activation = sigmoid(dot(
        factorization.word_embedding(target),
        factorization.context_embedding(context),
    ));
    if negative {
        -activation
    } else {
        1.0 - activation
    }
}
