//! Capacity accounting unit
//!
//! Every cache entry carries a weight; the store sums weights against its
//! configured capacity. Any unsigned integer works out of the box.

use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Quantity used for capacity accounting.
///
/// `Default` must be the additive zero.
pub trait Weight:
    Copy + Ord + Default + Debug + Send + Sync + Add<Output = Self> + Sub<Output = Self> + 'static
{
    /// The empty weight
    #[inline]
    fn zero() -> Self {
        Self::default()
    }
}

impl<T> Weight for T where
    T: Copy
        + Ord
        + Default
        + Debug
        + Send
        + Sync
        + Add<Output = T>
        + Sub<Output = T>
        + 'static
{
}
