//! # Negative-Sampling Strategies
//!
//! Three interchangeable ways to draw negative-sample word indices from
//! an evolving vocabulary:
//!
//! * [`SamplingStrategy::Uniform`] - uniform over live indices.
//! * [`SamplingStrategy::Empirical`] - alias-table sampling from
//!   normalized counts, refreshed on a burn-in/interval schedule; the
//!   table is stale between refreshes.
//! * [`SamplingStrategy::Reservoir`] - uniform draw from a reservoir of
//!   recently observed indices, which approximates the empirical
//!   distribution without ever scanning the counts.
//!
//! All three share a small surface: [`sample_idx`] to draw,
//! [`step`] once per observed token, and [`reset`] to force a
//! recomputation from current counts.
//!
//! [`sample_idx`]: SamplingStrategy::sample_idx
//! [`step`]: SamplingStrategy::step
//! [`reset`]: SamplingStrategy::reset

mod empirical;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[doc(inline)]
pub use empirical::EmpiricalSampling;

use crate::errors::SkResult;
use crate::math::{CountNormalizer, ReservoirSampler};
use crate::vocab::LanguageModel;

/// Default empirical refresh interval, in observed tokens.
pub const DEFAULT_REFRESH_INTERVAL: u64 = 64_000;

/// Default empirical burn-in, in observed tokens.
pub const DEFAULT_REFRESH_BURN_IN: u64 = 32_000;

/// Default reservoir capacity.
pub const DEFAULT_RESERVOIR_CAPACITY: usize = 100_000_000;

/// Closed dispatch over the negative-sampling strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SamplingStrategy {
    /// Uniform over the live vocabulary.
    Uniform,
    /// Alias-table sampling from normalized counts.
    Empirical(EmpiricalSampling),
    /// Uniform draw from a reservoir of observed indices.
    Reservoir(ReservoirSampler<usize>),
}

impl SamplingStrategy {
    /// Draw one external word index.
    ///
    /// Training-path recovery: a strategy whose internal state cannot
    /// produce a draw yet (no alias table during burn-in, an empty
    /// reservoir, or a stale table pointing past the live vocabulary)
    /// falls back to a uniform draw over live indices.
    pub fn sample_idx<R: Rng>(
        &mut self,
        language_model: &LanguageModel,
        rng: &mut R,
    ) -> usize {
        let size = language_model.size();
        assert!(size > 0, "sampling from an empty vocabulary");
        match self {
            Self::Uniform => rng.gen_range(0..size),
            Self::Empirical(empirical) => match empirical.sample_idx(language_model, rng) {
                Some(index) if index < size => index,
                _ => rng.gen_range(0..size),
            },
            Self::Reservoir(reservoir) => match reservoir.sample(rng) {
                Ok(index) if index < size => index,
                _ => rng.gen_range(0..size),
            },
        }
    }

    /// Observe one token occurrence with external index `word_idx`.
    pub fn step<R: Rng>(
        &mut self,
        language_model: &LanguageModel,
        word_idx: usize,
        rng: &mut R,
    ) {
        match self {
            Self::Uniform => {}
            Self::Empirical(empirical) => empirical.step(language_model),
            Self::Reservoir(reservoir) => {
                reservoir.insert(word_idx, rng);
            }
        }
    }

    /// Force recomputation from current counts using `normalizer`.
    ///
    /// For [`Self::Empirical`] a degenerate distribution here is fatal
    /// to training and is surfaced to the caller.
    pub fn reset<R: Rng>(
        &mut self,
        language_model: &LanguageModel,
        normalizer: &CountNormalizer,
        rng: &mut R,
    ) -> SkResult<()> {
        match self {
            Self::Uniform => Ok(()),
            Self::Empirical(empirical) => empirical.reset(language_model, normalizer),
            Self::Reservoir(reservoir) => reseed_reservoir(reservoir, language_model, normalizer, rng),
        }
    }
}

/// Deterministically seed `reservoir` in proportion to normalized
/// counts: `floor(p * capacity)` copies of each word, then one copy per
/// word in descending fractional-residual order, round-robin, until the
/// reservoir is full.
fn reseed_reservoir<R: Rng>(
    reservoir: &mut ReservoirSampler<usize>,
    language_model: &LanguageModel,
    normalizer: &CountNormalizer,
    rng: &mut R,
) -> SkResult<()> {
    let probs = normalizer.normalize(&language_model.counts())?;
    reservoir.clear();

    let capacity = reservoir.capacity();
    let mut inserted = 0usize;
    let mut residuals: Vec<(usize, f32)> = Vec::with_capacity(probs.len());
    for (index, &p) in probs.iter().enumerate() {
        let weight = p * capacity as f32;
        let whole = weight.floor();
        for _ in 0..whole as usize {
            reservoir.insert(index, rng);
            inserted += 1;
        }
        residuals.push((index, weight - whole));
    }

    residuals.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(core::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let mut round = 0usize;
    while inserted < capacity {
        reservoir.insert(residuals[round % residuals.len()].0, rng);
        inserted += 1;
        round += 1;
    }

    debug!(
        capacity,
        vocab = probs.len(),
        "reseeded negative-sampling reservoir"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::vocab::NaiveLanguageModel;

    fn lm_with_counts(counts: &[u64]) -> LanguageModel {
        let mut lm = NaiveLanguageModel::new(1e-3);
        for (i, &c) in counts.iter().enumerate() {
            let word = format!("w{i}");
            for _ in 0..c {
                lm.increment(&word);
            }
        }
        LanguageModel::Naive(lm)
    }

    #[test]
    fn test_uniform_stays_in_range() {
        let lm = lm_with_counts(&[3, 1, 1]);
        let mut strategy = SamplingStrategy::Uniform;
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..1000 {
            assert!(strategy.sample_idx(&lm, &mut rng) < 3);
        }
    }

    #[test]
    fn test_reservoir_draws_follow_observations() {
        let lm = lm_with_counts(&[1, 1]);
        let mut strategy =
            SamplingStrategy::Reservoir(ReservoirSampler::new(8).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..8 {
            strategy.step(&lm, 1, &mut rng);
        }
        for _ in 0..50 {
            assert_eq!(strategy.sample_idx(&lm, &mut rng), 1);
        }
    }

    #[test]
    fn test_empty_reservoir_falls_back_to_uniform() {
        let lm = lm_with_counts(&[1, 1, 1]);
        let mut strategy =
            SamplingStrategy::Reservoir(ReservoirSampler::new(4).unwrap());
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..100 {
            assert!(strategy.sample_idx(&lm, &mut rng) < 3);
        }
    }

    // Deterministic reseed: counts [4,2,1,1] with relative
    // frequencies and capacity 5 yield two copies of word 0, one of
    // word 1, and the two highest fractional residuals (words 2, 3).
    #[test]
    fn test_reservoir_reset_is_deterministic() {
        let lm = lm_with_counts(&[4, 2, 1, 1]);
        let reservoir = ReservoirSampler::new(5).unwrap();
        let mut strategy = SamplingStrategy::Reservoir(reservoir);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        strategy
            .reset(&lm, &CountNormalizer::new(1.0, 0.0), &mut rng)
            .unwrap();

        let SamplingStrategy::Reservoir(reservoir) = &strategy else {
            unreachable!();
        };
        let mut contents = reservoir.contents().to_vec();
        contents.sort_unstable();
        assert_eq!(contents, vec![0, 0, 1, 2, 3]);
    }

    #[test]
    fn test_empirical_reset_on_zero_mass_is_fatal() {
        let lm = lm_with_counts(&[]);
        let mut strategy = SamplingStrategy::Empirical(EmpiricalSampling::new(
            CountNormalizer::default(),
            DEFAULT_REFRESH_INTERVAL,
            DEFAULT_REFRESH_BURN_IN,
        ));
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(strategy
            .reset(&lm, &CountNormalizer::default(), &mut rng)
            .is_err());
    }
}
