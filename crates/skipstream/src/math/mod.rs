//! # Numeric Primitives
//!
//! Leaf components shared by the vocabulary and training layers:
//!
//! * [`AlignedMatrix`] - row-major `f32` storage with padded row strides.
//! * [`AliasSampler`] - O(1) sampling from a fixed discrete distribution.
//! * [`ReservoirSampler`] - bounded uniform sample of a stream.
//! * [`CountNormalizer`] - smoothed, exponentiated counts as probabilities.
//! * [`kernels`] - slice kernels (`dot`, `axpy`, `scale`, `sigmoid`).

pub mod kernels;

mod aligned_matrix;
mod alias_sampler;
mod count_normalizer;
mod reservoir_sampler;

#[doc(inline)]
pub use aligned_matrix::{AlignedMatrix, ALIGNMENT_FLOATS};
#[doc(inline)]
pub use alias_sampler::AliasSampler;
#[doc(inline)]
pub use count_normalizer::{CountNormalizer, DEFAULT_NORMALIZER_EXPONENT, DEFAULT_NORMALIZER_OFFSET};
#[doc(inline)]
pub use reservoir_sampler::ReservoirSampler;
