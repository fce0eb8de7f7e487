//! Float trait abstraction for f32/f64 support.
//!
//! The recursive filters are generic over the computation type so the same
//! engine runs in single or double precision.

use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::Debug;
use std::iter::Sum;

/// Floating point types supported by the recursive filters.
///
/// Combines the bounds needed by the coefficient solver and the line
/// recursion, plus `Send + Sync` so lines can be filtered on worker threads.
pub trait RecursiveFloat:
    Float + FromPrimitive + NumAssign + Sum + Debug + Send + Sync + 'static
{
    /// Create a value from an f64 constant.
    fn from_f64_c(val: f64) -> Self;

    /// Widen the value to f64, used for logging and error reporting.
    fn to_f64_c(self) -> f64;
}

impl RecursiveFloat for f32 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val as f32
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self as f64
    }
}

impl RecursiveFloat for f64 {
    #[inline]
    fn from_f64_c(val: f64) -> Self {
        val
    }

    #[inline]
    fn to_f64_c(self) -> f64 {
        self
    }
}
