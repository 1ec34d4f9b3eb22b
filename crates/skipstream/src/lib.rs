//! # `skipstream` Streaming Word Embeddings
//!
//! A single-pass, online skip-gram-with-negative-sampling (SGNS)
//! embedding trainer. The vocabulary is discovered as sentences arrive;
//! vocabulary statistics and embedding parameters co-evolve.
//!
//! See:
//! * [`model`] to configure and drive training.
//! * [`vocab`] for the exact and bounded (space-saving) word counters.
//! * [`sampling`] for the negative-sampling strategies.
//! * [`train`] for the SGD schedule and the SGNS learners.
//! * [`math`] for the numeric leaf components.
//!
//! ## Bounded vocabularies
//!
//! With the space-saving counter, the vocabulary never exceeds
//! `vocab_dim` word types. When the counter is full, an unseen word
//! evicts the minimum-count entry and *recycles its external index*:
//! the embedding rows and per-row SGD state behind that index are reset
//! before the new word trains. Exact counting is available via the
//! naive counter when the vocabulary is known to be small.
//!
//! ## Training example
//!
//! ```rust
//! use skipstream::model::{ContextOptions, ModelOptions, SamplingOptions};
//!
//! # fn main() -> skipstream::SkResult<()> {
//! let mut model = ModelOptions::default()
//!     .with_vocab_dim(1000)
//!     .with_embedding_dim(32)
//!     .with_neg_sampling(SamplingOptions::empirical())
//!     .with_context(ContextOptions::Dynamic { width: 5 })
//!     .with_seed(42)
//!     .init()?;
//!
//! // Sentences stream in from anywhere; the model is single-pass.
//! model.train_sentence(&["colorless", "green", "ideas", "sleep", "furiously"]);
//!
//! let mut snapshot = Vec::new();
//! model.save(&mut snapshot)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! The core is single-threaded: every training mutation flows through
//! `Model::train_sentence` under `&mut self`. Lock-free (HOGWILD!-style)
//! parallel sentence training is only sound when no eviction can occur
//! (naive counter, pre-frozen vocabulary) and the sampler is uniform or
//! a frozen alias snapshot; this crate documents the hook but does not
//! implement it.

#![warn(missing_docs, unused)]

pub mod errors;
pub mod math;
pub mod model;
pub mod rng;
pub mod sampling;
pub mod train;
pub mod types;
pub mod vocab;

#[doc(inline)]
pub use errors::{SkResult, SkipstreamError};
#[doc(inline)]
pub use model::{Model, ModelOptions};
