//! # Common Types and Traits

use core::fmt::{Debug, Display};
use core::hash::Hash;
use core::ops::AddAssign;

use num_traits::{FromPrimitive, PrimInt, ToPrimitive, Unsigned};

/// Type alias for hash maps in this crate.
pub type CommonHashMap<K, V> = ahash::AHashMap<K, V>;

/// Key type for vocabulary words.
///
/// Word streams are dominated by short strings; `CompactString` keeps
/// them inline.
pub type WordKey = compact_str::CompactString;

/// A type that can be used as a word count.
pub trait CountType:
    'static
    + PrimInt
    + Unsigned
    + FromPrimitive
    + ToPrimitive
    + Hash
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + AddAssign
{
}

impl<T> CountType for T where
    T: 'static
        + PrimInt
        + Unsigned
        + FromPrimitive
        + ToPrimitive
        + Hash
        + Default
        + Debug
        + Display
        + Send
        + Sync
        + AddAssign
{
}

#[cfg(test)]
mod tests {
    use core::marker::PhantomData;

    use super::*;

    #[test]
    fn test_common_count_types() {
        struct IsCount<T: CountType>(PhantomData<T>);

        let _: IsCount<u16>;
        let _: IsCount<u32>;
        let _: IsCount<u64>;
        let _: IsCount<usize>;
    }
}
