//! # Word-Context Factorization

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::AlignedMatrix;

/// Paired target/context embedding matrices of shape
/// `(vocab_dim, embedding_dim)`.
///
/// Row `e` of each matrix is the representation of the word with
/// external index `e`. Target rows start at small uniform noise and
/// context rows at zero; the asymmetric start is standard SGNS practice
/// (a symmetric zero init would leave every gradient coefficient at
/// exactly one half).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordContextFactorization {
    vocab_dim: usize,
    embedding_dim: usize,
    word_embeddings: AlignedMatrix,
    context_embeddings: AlignedMatrix,
}

impl WordContextFactorization {
    /// Create and randomly initialize a factorization.
    pub fn new<R: Rng>(
        vocab_dim: usize,
        embedding_dim: usize,
        rng: &mut R,
    ) -> Self {
        let mut factorization = Self {
            vocab_dim,
            embedding_dim,
            word_embeddings: AlignedMatrix::zeroed(vocab_dim, embedding_dim),
            context_embeddings: AlignedMatrix::zeroed(vocab_dim, embedding_dim),
        };
        for row in 0..vocab_dim {
            factorization.randomize_word_row(row, rng);
        }
        factorization
    }

    /// The vocabulary dimension (row count).
    pub fn vocab_dim(&self) -> usize {
        self.vocab_dim
    }

    /// The embedding dimension (logical row width).
    pub fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    /// Target embedding of the word at external index `row`.
    pub fn word_embedding(
        &self,
        row: usize,
    ) -> &[f32] {
        self.word_embeddings.row(row)
    }

    /// Mutable target embedding of the word at external index `row`.
    pub fn word_embedding_mut(
        &mut self,
        row: usize,
    ) -> &mut [f32] {
        self.word_embeddings.row_mut(row)
    }

    /// Context embedding of the word at external index `row`.
    pub fn context_embedding(
        &self,
        row: usize,
    ) -> &[f32] {
        self.context_embeddings.row(row)
    }

    /// Mutable context embedding of the word at external index `row`.
    pub fn context_embedding_mut(
        &mut self,
        row: usize,
    ) -> &mut [f32] {
        self.context_embeddings.row_mut(row)
    }

    /// Borrow a target row and a context row at once.
    ///
    /// The rows live in different matrices, so the borrows are disjoint
    /// even when `word_row == context_row`.
    pub fn word_and_context_rows_mut(
        &mut self,
        word_row: usize,
        context_row: usize,
    ) -> (&[f32], &mut [f32]) {
        (
            self.word_embeddings.row(word_row),
            self.context_embeddings.row_mut(context_row),
        )
    }

    /// Refill a target row with fresh `U(-0.5/d, +0.5/d)` noise.
    pub fn randomize_word_row<R: Rng>(
        &mut self,
        row: usize,
        rng: &mut R,
    ) {
        let half = 0.5 / self.embedding_dim as f32;
        for value in self.word_embeddings.row_mut(row) {
            *value = rng.gen_range(-half..half);
        }
    }

    /// Zero-fill a context row.
    pub fn zero_context_row(
        &mut self,
        row: usize,
    ) {
        self.context_embeddings.row_mut(row).fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_initialization_shapes_and_ranges() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let f = WordContextFactorization::new(6, 10, &mut rng);
        assert_eq!(f.vocab_dim(), 6);
        assert_eq!(f.embedding_dim(), 10);
        for row in 0..6 {
            assert!(f.word_embedding(row).iter().any(|v| *v != 0.0));
            assert!(f.word_embedding(row).iter().all(|v| v.abs() <= 0.05));
            assert!(f.context_embedding(row).iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn test_split_borrow_of_same_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut f = WordContextFactorization::new(2, 4, &mut rng);
        let (word, context) = f.word_and_context_rows_mut(1, 1);
        assert_eq!(word.len(), 4);
        context.fill(2.0);
        assert_eq!(f.context_embedding(1), &[2.0; 4]);
    }

    #[test]
    fn test_rerandomize_changes_word_row_only() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut f = WordContextFactorization::new(3, 8, &mut rng);
        let before_word = f.word_embedding(1).to_vec();
        let before_other = f.word_embedding(2).to_vec();
        f.randomize_word_row(1, &mut rng);
        assert_ne!(f.word_embedding(1), before_word.as_slice());
        assert_eq!(f.word_embedding(2), before_other.as_slice());
    }
}
