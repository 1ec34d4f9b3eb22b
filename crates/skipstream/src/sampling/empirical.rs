//! # Empirical Sampling

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::errors::SkResult;
use crate::math::{AliasSampler, CountNormalizer};
use crate::vocab::LanguageModel;

/// Alias-table sampling from normalized vocabulary counts.
///
/// The table is rebuilt from current counts on every step during
/// burn-in, then once every `refresh_interval` steps. Between rebuilds
/// the distribution is stale relative to the evolving vocabulary; that
/// staleness is the price of O(1) draws.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmpiricalSampling {
    refresh_interval: u64,
    refresh_burn_in: u64,
    normalizer: CountNormalizer,
    alias: Option<AliasSampler>,
    t: u64,
}

impl EmpiricalSampling {
    /// Create a strategy with an owned normalizer and refresh schedule.
    ///
    /// ## Arguments
    /// * `normalizer` - applied to counts at every rebuild.
    /// * `refresh_interval` - steps between rebuilds after burn-in.
    /// * `refresh_burn_in` - steps during which every step rebuilds.
    pub fn new(
        normalizer: CountNormalizer,
        refresh_interval: u64,
        refresh_burn_in: u64,
    ) -> Self {
        Self {
            refresh_interval: refresh_interval.max(1),
            refresh_burn_in,
            normalizer,
            alias: None,
            t: 0,
        }
    }

    /// Steps observed so far.
    pub fn ticks(&self) -> u64 {
        self.t
    }

    /// Draw from the (possibly stale) empirical distribution.
    ///
    /// Lazily builds the table on first use; returns `None` when no
    /// table can be built yet, letting the caller fall back to a
    /// uniform draw.
    pub fn sample_idx<R: Rng>(
        &mut self,
        language_model: &LanguageModel,
        rng: &mut R,
    ) -> Option<usize> {
        if self.alias.is_none() {
            self.rebuild(language_model);
        }
        self.alias.as_ref().map(|alias| alias.sample(rng))
    }

    /// Observe one step; rebuild the table when the schedule says so.
    pub fn step(
        &mut self,
        language_model: &LanguageModel,
    ) {
        self.t += 1;
        let due = self.alias.is_none()
            || self.t < self.refresh_burn_in
            || (self.t - self.refresh_burn_in) % self.refresh_interval == 0;
        if due {
            self.rebuild(language_model);
        }
    }

    /// Rebuild from current counts with the caller's normalizer.
    ///
    /// A degenerate distribution here aborts training: it means the
    /// normalizer is misconfigured for the vocabulary it is pointed at.
    pub fn reset(
        &mut self,
        language_model: &LanguageModel,
        normalizer: &CountNormalizer,
    ) -> SkResult<()> {
        let probs = normalizer.normalize(&language_model.counts())?;
        self.alias = Some(AliasSampler::new(probs)?);
        Ok(())
    }

    fn rebuild(
        &mut self,
        language_model: &LanguageModel,
    ) {
        // Degenerate counts (empty vocabulary) during burn-in are not an
        // error; sampling falls back to uniform until counts exist.
        let built = self
            .normalizer
            .normalize(&language_model.counts())
            .and_then(AliasSampler::new);
        if let Ok(alias) = built {
            trace!(t = self.t, outcomes = alias.len(), "rebuilt alias table");
            self.alias = Some(alias);
        }
    }
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
    fn test_lazy_initialization_on_first_draw() {
        let lm = lm_with_counts(&[10, 1, 1, 1]);
        let mut sampling = EmpiricalSampling::new(CountNormalizer::new(1.0, 0.0), 5, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(sampling.sample_idx(&lm, &mut rng).is_some());
        assert!(sampling.alias.is_some());
    }

    #[test]
    fn test_empty_vocabulary_yields_no_draw() {
        let lm = lm_with_counts(&[]);
        let mut sampling =
            EmpiricalSampling::new(CountNormalizer::default(), 5, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(sampling.sample_idx(&lm, &mut rng), None);
    }

    #[test]
    fn test_stale_between_refreshes() {
        let mut lm = lm_with_counts(&[5]);
        let mut sampling = EmpiricalSampling::new(CountNormalizer::new(1.0, 0.0), 100, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        // Build over a single-word vocabulary.
        assert_eq!(sampling.sample_idx(&lm, &mut rng), Some(0));

        // Grow the vocabulary; without a refresh due, draws still come
        // from the stale one-word table.
        lm.increment("late");
        sampling.step(&lm);
        for _ in 0..20 {
            assert_eq!(sampling.sample_idx(&lm, &mut rng), Some(0));
        }
    }

    // Counts [10,1,1,1] with burn-in 3 and interval 5
    // put well over half the mass on item 0.
    #[test]
    fn test_head_word_dominates_draws() {
        let lm = lm_with_counts(&[10, 1, 1, 1]);
        let mut sampling = EmpiricalSampling::new(CountNormalizer::new(1.0, 0.0), 5, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        for _ in 0..3 {
            sampling.step(&lm);
        }
        let mut head = 0;
        for _ in 0..100 {
            if sampling.sample_idx(&lm, &mut rng) == Some(0) {
                head += 1;
            }
        }
        assert!(head > 50, "head drawn only {head} times");
    }
}
