//! Data type system for elimination buffers
//!
//! The kernels are generic over [`Element`]; [`DType`] is the runtime tag used
//! when a strategy only exists for one precision (the SSE/NEON intrinsics are
//! single precision only).

mod element;

pub use element::Element;

use std::fmt;

/// Floating-point element types supported by the elimination kernels
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 64-bit IEEE 754 double precision
    F64,
    /// 32-bit IEEE 754 single precision
    F32,
}

impl DType {
    /// Size of one element in bytes
    #[inline]
    pub const fn size_in_bytes(self) -> usize {
        match self {
            Self::F64 => 8,
            Self::F32 => 4,
        }
    }

    /// Short lowercase name
    #[inline]
    pub const fn short_name(self) -> &'static str {
        match self {
            Self::F64 => "f64",
            Self::F32 => "f32",
        }
    }

    /// Relative tolerance suitable for comparing FMA and non-FMA results
    #[inline]
    pub const fn default_rtol(self) -> f64 {
        match self {
            Self::F64 => 1e-10,
            Self::F32 => 1e-4,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
