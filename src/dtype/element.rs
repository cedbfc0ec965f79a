//! Element trait for mapping Rust types to DType

use super::DType;
use bytemuck::{Pod, Zeroable};
use num_traits::Float;
use std::fmt::{Debug, Display};

/// Trait for types that can be stored in an elimination buffer
///
/// # Bounds
/// - `Copy + Send + Sync + 'static` - rows are handed to worker threads
/// - `Pod + Zeroable` - zeroed allocation and lane-chunk views (bytemuck)
/// - `Float` - arithmetic, `mul_add` and finiteness checks
pub trait Element:
    Copy + Send + Sync + Pod + Zeroable + Float + Debug + Display + 'static
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for tolerance checks and diagnostics
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    fn from_f64(v: f64) -> Self;
}

impl Element for f64 {
    const DTYPE: DType = DType::F64;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl Element for f32 {
    const DTYPE: DType = DType::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}
