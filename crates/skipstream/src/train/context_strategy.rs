//! # Context Window Sizing

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Default symmetric context width.
pub const DEFAULT_CONTEXT_WIDTH: usize = 5;

/// How many words of left/right context a target position trains on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextStrategy {
    /// Fixed symmetric width, thresholded by availability.
    Static {
        /// Symmetric context width.
        width: usize,
    },
    /// Width sampled uniformly from `1..=width` per call, as in
    /// word2vec, then thresholded by availability.
    Dynamic {
        /// Maximum symmetric context width.
        width: usize,
    },
}

impl ContextStrategy {
    /// Left/right context sizes given `avail_left` and `avail_right`
    /// neighboring words.
    pub fn size<R: Rng>(
        &self,
        avail_left: usize,
        avail_right: usize,
        rng: &mut R,
    ) -> (usize, usize) {
        match *self {
            Self::Static { width } => (width.min(avail_left), width.min(avail_right)),
            Self::Dynamic { width } => {
                if width == 0 {
                    return (0, 0);
                }
                let drawn = rng.gen_range(1..=width);
                (drawn.min(avail_left), drawn.min(avail_right))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_static_thresholds_by_availability() {
        let ctx = ContextStrategy::Static { width: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_eq!(ctx.size(10, 10, &mut rng), (3, 3));
        assert_eq!(ctx.size(1, 0, &mut rng), (1, 0));
        assert_eq!(ctx.size(0, 2, &mut rng), (0, 2));
    }

    // Over many draws on a 20-token sentence, the
    // window respects availability and the drawn width stays in 1..=5.
    #[test]
    fn test_dynamic_draws_stay_in_bounds() {
        let ctx = ContextStrategy::Dynamic { width: 5 };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let len = 20usize;
        for _ in 0..10_000 {
            for p in 0..len {
                let (left, right) = ctx.size(p, len - 1 - p, &mut rng);
                assert!(left <= p);
                assert!(right <= len - 1 - p);
                let widest = left.max(right);
                assert!((1..=5).contains(&widest));
            }
        }
    }

    #[test]
    fn test_dynamic_covers_the_width_range() {
        let ctx = ContextStrategy::Dynamic { width: 4 };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            let (left, _) = ctx.size(10, 10, &mut rng);
            seen[left] = true;
        }
        assert_eq!(seen, [false, true, true, true, true]);
    }
}
