//! SIMD detection and lane abstractions
//!
//! This module provides runtime CPU feature detection, used once at startup
//! to choose lane widths and to decide whether the intrinsic strategies can
//! run, plus the portable [`Lanes`] type the vector strategies are written in.
//!
//! # Architecture Support
//!
//! | Architecture | Instruction Set | Vector Width | f32 lanes | f64 lanes |
//! |--------------|-----------------|--------------|-----------|-----------|
//! | x86-64       | AVX-512F + FMA  | 512 bits     | 16        | 8         |
//! | x86-64       | AVX2 + FMA      | 256 bits     | 8         | 4         |
//! | x86-64       | SSE2            | 128 bits     | 4         | 2         |
//! | ARM64        | NEON            | 128 bits     | 4         | 2         |
//! | Any          | Scalar          | N/A          | 1         | 1         |

mod lanes;

pub use lanes::{Lanes, is_lane_aligned, split_lanes, split_lanes_mut};

use crate::dtype::DType;
use std::sync::OnceLock;

/// SIMD capability level detected at runtime
///
/// Higher values indicate wider vector registers.
///
/// Note: All variants are defined on all platforms, but some are only
/// constructed at runtime on their respective architectures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(dead_code)]
pub enum SimdLevel {
    /// AVX-512F with FMA support (512-bit vectors)
    Avx512 = 4,
    /// AVX2 with FMA support (256-bit vectors)
    Avx2Fma = 3,
    /// SSE2, the x86-64 baseline (128-bit vectors)
    Sse2 = 2,
    /// NEON, the AArch64 baseline (128-bit vectors)
    Neon = 1,
    /// Scalar fallback (no SIMD)
    Scalar = 0,
}

impl SimdLevel {
    /// Returns true if this is an x86-64 SIMD level
    #[inline]
    pub const fn is_x86(self) -> bool {
        matches!(self, Self::Avx512 | Self::Avx2Fma | Self::Sse2)
    }

    /// Returns true if this is an ARM64 SIMD level
    #[inline]
    pub const fn is_arm64(self) -> bool {
        matches!(self, Self::Neon)
    }

    /// Returns true if 4-wide single precision registers are available
    ///
    /// This is the requirement of the SSE/NEON intrinsic strategies.
    #[inline]
    pub const fn has_f32x4(self) -> bool {
        !matches!(self, Self::Scalar)
    }

    /// Returns true if hardware fused multiply-add is available
    #[inline]
    pub const fn has_fma(self) -> bool {
        matches!(self, Self::Avx512 | Self::Avx2Fma | Self::Neon)
    }

    /// Returns the number of f32 elements per vector register
    #[inline]
    pub const fn f32_lanes(self) -> usize {
        match self {
            Self::Avx512 => 16,
            Self::Avx2Fma => 8,
            Self::Sse2 | Self::Neon => 4,
            Self::Scalar => 1,
        }
    }

    /// Returns the number of f64 elements per vector register
    #[inline]
    pub const fn f64_lanes(self) -> usize {
        match self {
            Self::Avx512 => 8,
            Self::Avx2Fma => 4,
            Self::Sse2 | Self::Neon => 2,
            Self::Scalar => 1,
        }
    }

    /// Returns the number of `dtype` elements per vector register
    #[inline]
    pub const fn lanes(self, dtype: DType) -> usize {
        match dtype {
            DType::F32 => self.f32_lanes(),
            DType::F64 => self.f64_lanes(),
        }
    }

    /// Returns the name of this SIMD level as a string
    #[inline]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Avx512 => "AVX-512",
            Self::Avx2Fma => "AVX2+FMA",
            Self::Sse2 => "SSE2",
            Self::Neon => "NEON",
            Self::Scalar => "Scalar",
        }
    }
}

impl std::fmt::Display for SimdLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached SIMD level detection
static SIMD_LEVEL: OnceLock<SimdLevel> = OnceLock::new();

/// Detect the best available SIMD level for the current CPU
///
/// The first call performs detection and logs the result; later calls return
/// the cached value.
#[inline]
pub fn detect_simd() -> SimdLevel {
    *SIMD_LEVEL.get_or_init(|| {
        let level = detect_simd_uncached();
        tracing::info!(
            simd_level = %level,
            f32_lanes = level.f32_lanes(),
            f64_lanes = level.f64_lanes(),
            "SIMD level detected"
        );
        level
    })
}

/// Perform actual CPU feature detection (called once)
#[cold]
fn detect_simd_uncached() -> SimdLevel {
    #[cfg(target_arch = "x86_64")]
    {
        if is_x86_feature_detected!("avx512f")
            && is_x86_feature_detected!("avx512vl")
            && is_x86_feature_detected!("fma")
        {
            return SimdLevel::Avx512;
        }

        if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
            return SimdLevel::Avx2Fma;
        }

        if is_x86_feature_detected!("sse2") {
            return SimdLevel::Sse2;
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        // NEON is mandatory for AArch64
        return SimdLevel::Neon;
    }

    #[allow(unreachable_code)]
    SimdLevel::Scalar
}
