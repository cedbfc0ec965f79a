//! Portable fixed-width lane values
//!
//! `Lanes<T, N>` is a plain `[T; N]` with the three operations the vector
//! strategies need. Lane views over a row come from `slice::as_chunks`, so a
//! row is never reinterpreted as register-typed memory: the compiler sees
//! ordinary array loads and stores and is free to map them onto vector
//! registers.

use crate::dtype::Element;

/// `N` values of `T` processed together
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct Lanes<T: Element, const N: usize>([T; N]);

impl<T: Element, const N: usize> Lanes<T, N> {
    /// All lanes set to `value`
    #[inline(always)]
    pub fn splat(value: T) -> Self {
        Self([value; N])
    }

    /// Load one lane chunk
    #[inline(always)]
    pub fn load(src: &[T; N]) -> Self {
        Self(*src)
    }

    /// Store into one lane chunk
    #[inline(always)]
    pub fn store(self, dst: &mut [T; N]) {
        *dst = self.0;
    }

    /// Lane-wise `self * a + b` with a single rounding
    #[inline(always)]
    pub fn mul_add(self, a: Self, b: Self) -> Self {
        let mut out = b.0;
        for ((o, &x), &y) in out.iter_mut().zip(&self.0).zip(&a.0) {
            *o = x.mul_add(y, *o);
        }
        Self(out)
    }

    /// The lane values as an array
    #[inline(always)]
    pub fn to_array(self) -> [T; N] {
        self.0
    }
}

/// Split `data` into whole lane chunks and a scalar tail
#[inline(always)]
pub fn split_lanes<T, const N: usize>(data: &[T]) -> (&[[T; N]], &[T]) {
    data.as_chunks::<N>()
}

/// Mutable counterpart of [`split_lanes`]
#[inline(always)]
pub fn split_lanes_mut<T, const N: usize>(data: &mut [T]) -> (&mut [[T; N]], &mut [T]) {
    data.as_chunks_mut::<N>()
}

/// Returns true if `data` starts on a boundary of `N` elements of `T`
#[inline]
pub fn is_lane_aligned<T, const N: usize>(data: &[T]) -> bool {
    (data.as_ptr() as usize) % (N * std::mem::size_of::<T>()) == 0
}
