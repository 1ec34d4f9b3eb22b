//! # Error Types

/// Errors from skipstream operations.
#[derive(Debug, thiserror::Error)]
pub enum SkipstreamError {
    /// A query named a word the language model does not track.
    #[error("unknown word: {word:?}")]
    UnknownWord {
        /// The word that was queried.
        word: String,
    },

    /// An external word index was out of range.
    #[error("invalid word index: {index}")]
    InvalidIndex {
        /// The offending index.
        index: i64,
    },

    /// A sampling distribution could not be built.
    ///
    /// Raised when normalizing all-zero counts without smoothing, or when
    /// an alias table is requested over an empty or non-finite
    /// probability vector.
    #[error("degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// A sample was drawn from a reservoir before any insert.
    #[error("empty reservoir")]
    EmptyReservoir,

    /// A capacity or dimension was invalid at configuration time.
    #[error("capacity exhausted: {0}")]
    CapacityExhausted(String),

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded or decoded.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// Result type for skipstream operations.
pub type SkResult<T> = core::result::Result<T, SkipstreamError>;
