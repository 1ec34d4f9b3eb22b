//! # Alias-Method Sampler

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{SkResult, SkipstreamError};

/// O(1) sampler over a fixed discrete distribution (Vose's alias method).
///
/// The table is a snapshot: it does not observe later changes to the
/// counts it was built from. Rebuild it to pick up a new distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasSampler {
    prob: Vec<f32>,
    alias: Vec<usize>,
}

impl AliasSampler {
    /// Build the alias table from a probability vector.
    ///
    /// The entries must be finite, nonnegative, and sum to roughly one;
    /// construction is O(n).
    ///
    /// ## Arguments
    /// * `probabilities` - the distribution to sample from.
    pub fn new(probabilities: Vec<f32>) -> SkResult<Self> {
        let n = probabilities.len();
        if n == 0 {
            return Err(SkipstreamError::DegenerateDistribution(
                "alias table over empty probability vector".into(),
            ));
        }
        if probabilities.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(SkipstreamError::DegenerateDistribution(
                "alias table over non-finite or negative probabilities".into(),
            ));
        }

        // Work in the scaled space p[i] * n, where an entry is "small"
        // below 1.  Pairing one small with one large per round fills
        // exactly one table cell, so the build is linear.
        let mut scaled: Vec<f32> = probabilities.iter().map(|p| p * n as f32).collect();
        let mut small: Vec<usize> = Vec::with_capacity(n);
        let mut large: Vec<usize> = Vec::with_capacity(n);
        for (i, s) in scaled.iter().enumerate() {
            if *s < 1.0 {
                small.push(i);
            } else {
                large.push(i);
            }
        }

        let mut prob = vec![1.0f32; n];
        let mut alias: Vec<usize> = (0..n).collect();

        while let (Some(s), Some(l)) = (small.pop(), large.pop()) {
            prob[s] = scaled[s];
            alias[s] = l;
            scaled[l] = (scaled[l] + scaled[s]) - 1.0;
            if scaled[l] < 1.0 {
                small.push(l);
            } else {
                large.push(l);
            }
        }
        // Leftovers are within rounding error of 1.
        for l in large {
            prob[l] = 1.0;
        }
        for s in small {
            prob[s] = 1.0;
        }

        Ok(Self { prob, alias })
    }

    /// The number of outcomes.
    pub fn len(&self) -> usize {
        self.prob.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.prob.is_empty()
    }

    /// Draw one outcome index.
    pub fn sample<R: Rng>(
        &self,
        rng: &mut R,
    ) -> usize {
        let i = rng.gen_range(0..self.prob.len());
        let u: f32 = rng.gen();
        if u < self.prob[i] {
            i
        } else {
            self.alias[i]
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_empty_distribution_is_rejected() {
        assert!(matches!(
            AliasSampler::new(vec![]),
            Err(SkipstreamError::DegenerateDistribution(_))
        ));
    }

    #[test]
    fn test_invalid_probabilities_are_rejected() {
        assert!(AliasSampler::new(vec![0.5, f32::NAN]).is_err());
        assert!(AliasSampler::new(vec![0.5, f32::INFINITY]).is_err());
        assert!(AliasSampler::new(vec![1.5, -0.5]).is_err());
    }

    #[test]
    fn test_singleton_always_sampled() {
        let sampler = AliasSampler::new(vec![1.0]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(sampler.sample(&mut rng), 0);
        }
    }

    #[test]
    fn test_zero_probability_never_sampled() {
        let sampler = AliasSampler::new(vec![0.5, 0.0, 0.5]).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..10_000 {
            assert_ne!(sampler.sample(&mut rng), 1);
        }
    }

    // Empirical frequencies over 1e6 draws match
    // the input distribution within 3 sigma of the per-bin binomial
    // deviation.
    #[test]
    fn test_empirical_frequencies_match() {
        let p = vec![0.5, 0.3, 0.15, 0.05];
        let sampler = AliasSampler::new(p.clone()).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let n = 1_000_000usize;
        let mut hits = vec![0u64; p.len()];
        for _ in 0..n {
            hits[sampler.sample(&mut rng)] += 1;
        }

        for (i, pi) in p.iter().enumerate() {
            let pi = *pi as f64;
            let expected = pi * n as f64;
            let sigma = (n as f64 * pi * (1.0 - pi)).sqrt();
            let delta = (hits[i] as f64 - expected).abs();
            assert!(
                delta <= 3.0 * sigma,
                "bin {i}: |{} - {expected}| > 3 * {sigma}",
                hits[i]
            );
        }
    }
}
