//! # Count Normalizer

use serde::{Deserialize, Serialize};

use crate::errors::{SkResult, SkipstreamError};
use crate::types::CountType;

/// Default distortion exponent, as in word2vec negative sampling.
pub const DEFAULT_NORMALIZER_EXPONENT: f32 = 0.75;

/// Default additive smoothing.
pub const DEFAULT_NORMALIZER_OFFSET: f32 = 0.0;

/// Turns raw counts into a probability vector.
///
/// `p[i] = (c[i] + offset)^exponent / sum_j (c[j] + offset)^exponent`.
/// The exponent flattens the head of a Zipfian count distribution; the
/// offset smooths zero counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountNormalizer {
    exponent: f32,
    offset: f32,
}

impl Default for CountNormalizer {
    fn default() -> Self {
        Self {
            exponent: DEFAULT_NORMALIZER_EXPONENT,
            offset: DEFAULT_NORMALIZER_OFFSET,
        }
    }
}

impl CountNormalizer {
    /// Create a normalizer.
    ///
    /// ## Arguments
    /// * `exponent` - distortion applied to each smoothed count.
    /// * `offset` - additive smoothing; must be nonnegative.
    pub fn new(
        exponent: f32,
        offset: f32,
    ) -> Self {
        Self { exponent, offset }
    }

    /// The distortion exponent.
    pub fn exponent(&self) -> f32 {
        self.exponent
    }

    /// The additive smoothing.
    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Normalize `counts` into a probability vector.
    ///
    /// Fails with [`SkipstreamError::DegenerateDistribution`] when
    /// `counts` is empty, or when every smoothed count is zero.
    pub fn normalize<C: CountType>(
        &self,
        counts: &[C],
    ) -> SkResult<Vec<f32>> {
        if counts.is_empty() {
            return Err(SkipstreamError::DegenerateDistribution(
                "normalize over empty counts".into(),
            ));
        }

        let exponent = self.exponent as f64;
        let offset = self.offset as f64;
        let terms: Vec<f64> = counts
            .iter()
            .map(|c| (c.to_f64().unwrap_or(0.0) + offset).powf(exponent))
            .collect();
        let denom: f64 = terms.iter().sum();
        if denom <= 0.0 || !denom.is_finite() {
            return Err(SkipstreamError::DegenerateDistribution(format!(
                "normalize over {} counts with zero mass",
                counts.len()
            )));
        }

        Ok(terms.iter().map(|t| (t / denom) as f32).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sums_to_one(probs: &[f32]) {
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5, "sum was {sum}");
    }

    #[test]
    fn test_identity_exponent_matches_relative_frequency() {
        let n = CountNormalizer::new(1.0, 0.0);
        let probs = n.normalize(&[4u64, 2, 1, 1]).unwrap();
        assert_sums_to_one(&probs);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_default_exponent_flattens_the_head() {
        let n = CountNormalizer::default();
        let probs = n.normalize(&[100u64, 1]).unwrap();
        assert_sums_to_one(&probs);
        // 100^0.75 / (100^0.75 + 1) < 100 / 101
        assert!(probs[0] < 100.0 / 101.0);
        assert!(probs[1] > 1.0 / 101.0);
    }

    #[test]
    fn test_offset_gives_mass_to_zero_counts() {
        let n = CountNormalizer::new(1.0, 1.0);
        let probs = n.normalize(&[0u64, 0, 2]).unwrap();
        assert_sums_to_one(&probs);
        assert!(probs[0] > 0.0);
        assert_eq!(probs[0], probs[1]);
        assert!(probs[2] > probs[0]);
    }

    #[test]
    fn test_all_zero_without_smoothing_fails() {
        let n = CountNormalizer::new(1.0, 0.0);
        assert!(matches!(
            n.normalize(&[0u64, 0, 0]),
            Err(SkipstreamError::DegenerateDistribution(_))
        ));
    }

    #[test]
    fn test_empty_input_fails() {
        let n = CountNormalizer::default();
        assert!(n.normalize(&[] as &[u64]).is_err());
    }

    #[test]
    fn test_generic_over_count_width() {
        let n = CountNormalizer::new(1.0, 0.0);
        let a = n.normalize(&[1u32, 3]).unwrap();
        let b = n.normalize(&[1u64, 3]).unwrap();
        assert_eq!(a, b);
    }
}
