//! # Reservoir Sampler

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{SkResult, SkipstreamError};

/// Bounded uniform sample of a stream of unknown length.
///
/// Classic replacement scheme: the first `capacity` items fill the
/// buffer in order; afterwards item `n` (zero-based) displaces a random
/// occupant with probability `capacity / (n + 1)`. At any point the
/// buffer is a uniform sample of everything inserted since the last
/// [`clear`](Self::clear).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservoirSampler<T> {
    capacity: usize,
    seen: u64,
    buf: Vec<T>,
}

impl<T: Copy> ReservoirSampler<T> {
    /// Create an empty reservoir.
    ///
    /// ## Arguments
    /// * `capacity` - maximum number of retained items; must be nonzero.
    pub fn new(capacity: usize) -> SkResult<Self> {
        if capacity == 0 {
            return Err(SkipstreamError::CapacityExhausted(
                "reservoir capacity must be nonzero".into(),
            ));
        }
        Ok(Self {
            capacity,
            seen: 0,
            buf: Vec::new(),
        })
    }

    /// Maximum number of retained items.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of currently occupied slots.
    pub fn filled_size(&self) -> usize {
        self.buf.len()
    }

    /// Number of items inserted since the last clear.
    pub fn stream_count(&self) -> u64 {
        self.seen
    }

    /// Is the reservoir empty?
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The occupied slots, in physical order.
    pub fn contents(&self) -> &[T] {
        &self.buf
    }

    /// Offer an item to the reservoir.
    ///
    /// Returns the displaced item, if the insert replaced one.
    pub fn insert<R: Rng>(
        &mut self,
        item: T,
        rng: &mut R,
    ) -> Option<T> {
        let n = self.seen;
        self.seen += 1;
        if self.buf.len() < self.capacity {
            self.buf.push(item);
            return None;
        }
        // Slot j < capacity with probability capacity / (n + 1); the
        // chosen slot is itself uniform.
        let j = rng.gen_range(0..=n);
        if (j as usize) < self.capacity {
            Some(core::mem::replace(&mut self.buf[j as usize], item))
        } else {
            None
        }
    }

    /// Draw uniformly from the occupied slots.
    pub fn sample<R: Rng>(
        &self,
        rng: &mut R,
    ) -> SkResult<T> {
        if self.buf.is_empty() {
            return Err(SkipstreamError::EmptyReservoir);
        }
        Ok(self.buf[rng.gen_range(0..self.buf.len())])
    }

    /// Forget everything: stream count and occupancy both reset.
    pub fn clear(&mut self) {
        self.seen = 0;
        self.buf.clear();
    }
}
