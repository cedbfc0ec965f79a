//! Single-precision row updates through platform intrinsics
//!
//! Lane width is pinned to four f32 values (one 128-bit register). Each lane
//! is updated with a separate multiply and subtract, so columns at or right
//! of the pivot round exactly as in [`Scalar`](super::Scalar).
//!
//! | Architecture | Instruction Set |
//! |--------------|-----------------|
//! | x86-64       | SSE             |
//! | ARM64        | NEON            |
//!
//! On any other target the strategies cannot be constructed.

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "x86_64")]
mod sse;

use super::RowUpdate;
use super::vector::lane_columns;
use crate::buffer::Matrix;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::simd::{SimdLevel, detect_simd};
use std::ops::Range;

/// f32 values per 128-bit register
pub const F32_LANES: usize = 4;

/// Check that the detected level can run the 4-lane f32 kernels
fn check_level(level: SimdLevel) -> Result<()> {
    if !cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) {
        return Err(Error::backend_limitation(
            "intrinsic",
            "eliminate",
            format!("no 128-bit intrinsics for {}", std::env::consts::ARCH),
        ));
    }
    if !level.has_f32x4() {
        return Err(Error::backend_limitation(
            "intrinsic",
            "eliminate",
            format!("{level} has no 128-bit f32 registers"),
        ));
    }
    Ok(())
}

fn validate_f32<T: Element>(name: &'static str, matrix: &Matrix<T>) -> Result<()> {
    if T::DTYPE != DType::F32 {
        return Err(Error::unsupported_dtype(T::DTYPE, name));
    }
    super::vector::validate_lanes::<T, F32_LANES>(name, matrix)
}

/// View `T` rows as f32 rows, `None` for any other element type
#[inline(always)]
fn as_f32<'a, T: Element>(
    base: &'a [T],
    target: &'a mut [T],
) -> Option<(&'a [f32], &'a mut [f32])> {
    if T::DTYPE != DType::F32 {
        return None;
    }
    let base = bytemuck::try_cast_slice::<T, f32>(base).ok()?;
    let target = bytemuck::try_cast_slice_mut::<T, f32>(target).ok()?;
    Some((base, target))
}

/// Scalar tail shared by the architecture kernels
///
/// # Safety
/// - `base` must be valid for `len` reads and `target` for `len` writes
#[inline(always)]
unsafe fn sub_scaled_scalar_f32(base: *const f32, target: *mut f32, scale: f32, len: usize) {
    for i in 0..len {
        *target.add(i) -= scale * *base.add(i);
    }
}

/// Four f32 columns per instruction sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Intrinsic {
    level: SimdLevel,
}

impl Intrinsic {
    /// Create for the CPU this process runs on
    ///
    /// # Errors
    /// [`Error::BackendLimitation`] if the CPU has no 128-bit f32 unit.
    pub fn new() -> Result<Self> {
        let level = detect_simd();
        check_level(level)?;
        Ok(Self { level })
    }

    /// SIMD level detected at construction
    pub fn level(&self) -> SimdLevel {
        self.level
    }
}

impl<T: Element> RowUpdate<T> for Intrinsic {
    fn name(&self) -> &'static str {
        "intrinsic"
    }

    #[inline]
    fn columns(&self, line: usize, width: usize) -> Range<usize> {
        lane_columns::<F32_LANES>(line, width)
    }

    fn validate(&self, matrix: &Matrix<T>) -> Result<()> {
        validate_f32("intrinsic", matrix)
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let Some((b, t)) = as_f32(base, target) else {
            super::Scalar.update_row(base, target, scale);
            return;
        };
        let scale = Element::to_f64(scale) as f32;
        let len = b.len().min(t.len());

        #[cfg(target_arch = "x86_64")]
        unsafe {
            sse::sub_scaled_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
        #[cfg(target_arch = "aarch64")]
        unsafe {
            neon::sub_scaled_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        unsafe {
            sub_scaled_scalar_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
    }
}

/// [`Intrinsic`] unrolled to sixteen columns per iteration
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnrolledIntrinsic {
    level: SimdLevel,
}

impl UnrolledIntrinsic {
    /// Create for the CPU this process runs on
    ///
    /// # Errors
    /// [`Error::BackendLimitation`] if the CPU has no 128-bit f32 unit.
    pub fn new() -> Result<Self> {
        let level = detect_simd();
        check_level(level)?;
        Ok(Self { level })
    }

    /// SIMD level detected at construction
    pub fn level(&self) -> SimdLevel {
        self.level
    }
}

impl<T: Element> RowUpdate<T> for UnrolledIntrinsic {
    fn name(&self) -> &'static str {
        "unrolled-intrinsic"
    }

    #[inline]
    fn columns(&self, line: usize, width: usize) -> Range<usize> {
        lane_columns::<F32_LANES>(line, width)
    }

    fn validate(&self, matrix: &Matrix<T>) -> Result<()> {
        validate_f32("unrolled-intrinsic", matrix)
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let Some((b, t)) = as_f32(base, target) else {
            super::Scalar.update_row(base, target, scale);
            return;
        };
        let scale = Element::to_f64(scale) as f32;
        let len = b.len().min(t.len());

        #[cfg(target_arch = "x86_64")]
        unsafe {
            sse::sub_scaled_unrolled_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
        #[cfg(target_arch = "aarch64")]
        unsafe {
            neon::sub_scaled_unrolled_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        unsafe {
            sub_scaled_scalar_f32(b.as_ptr(), t.as_mut_ptr(), scale, len);
        }
    }
}
