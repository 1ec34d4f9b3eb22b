//! # Aligned Matrix

use serde::{Deserialize, Serialize};

/// Row stride granularity, in `f32` lanes (32 bytes).
pub const ALIGNMENT_FLOATS: usize = 8;

/// Row-major dense `f32` matrix with padded rows.
///
/// The physical row width (`stride`) is the logical column count rounded
/// up to a multiple of [`ALIGNMENT_FLOATS`], so each row starts on a
/// vector-friendly boundary. Padding lanes are zero and never touched by
/// row accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedMatrix {
    rows: usize,
    cols: usize,
    stride: usize,
    data: Vec<f32>,
}

impl AlignedMatrix {
    /// Create a zero-filled matrix of the given logical shape.
    pub fn zeroed(
        rows: usize,
        cols: usize,
    ) -> Self {
        let stride = cols.next_multiple_of(ALIGNMENT_FLOATS);
        Self {
            rows,
            cols,
            stride,
            data: vec![0.0; rows * stride],
        }
    }

    /// The number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// The logical number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The physical row width.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Borrow row `idx` as a `cols`-length slice.
    ///
    /// ## Panics
    /// Panics if `idx` is out of range.
    pub fn row(
        &self,
        idx: usize,
    ) -> &[f32] {
        assert!(idx < self.rows, "row {idx} out of range ({})", self.rows);
        let start = idx * self.stride;
        &self.data[start..start + self.cols]
    }

    /// Mutably borrow row `idx` as a `cols`-length slice.
    ///
    /// ## Panics
    /// Panics if `idx` is out of range.
    pub fn row_mut(
        &mut self,
        idx: usize,
    ) -> &mut [f32] {
        assert!(idx < self.rows, "row {idx} out of range ({})", self.rows);
        let start = idx * self.stride;
        &mut self.data[start..start + self.cols]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_rounds_up() {
        let m = AlignedMatrix::zeroed(3, 5);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 5);
        assert_eq!(m.stride(), 8);
        assert_eq!(m.row(0).len(), 5);
    }

    #[test]
    fn test_aligned_width_is_not_padded_further() {
        let m = AlignedMatrix::zeroed(2, 16);
        assert_eq!(m.stride(), 16);
    }

    #[test]
    fn test_rows_are_independent() {
        let mut m = AlignedMatrix::zeroed(2, 3);
        m.row_mut(0).copy_from_slice(&[1.0, 2.0, 3.0]);
        m.row_mut(1).copy_from_slice(&[4.0, 5.0, 6.0]);
        assert_eq!(m.row(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_row_out_of_range_panics() {
        let m = AlignedMatrix::zeroed(2, 3);
        let _ = m.row(2);
    }
}
