//! Lane-wide row updates with fused multiply-add
//!
//! The sweep for pivot `line` starts at the lane boundary at or before `line`
//! and ends at `width` rounded up to a whole lane:
//!
//! ```text
//!             line & !(N-1)   line            width    round_up(width, N)
//!                   |          |                |          |
//! row y:  ... stale | recomputed | live columns | padding  |
//! ```
//!
//! Columns left of `line` are recomputed against the pivot row's own stale
//! residues and never read as part of the reduced system. Padding columns are
//! zero in both rows, and `fma(-s, 0, 0)` keeps them zero.
//!
//! Rows start on 64-byte boundaries and `line & !(N-1)` is a lane multiple,
//! so every chunk is a whole, aligned lane.

use super::RowUpdate;
use crate::buffer::Matrix;
use crate::dtype::Element;
use crate::error::{Error, Result};
use crate::simd::{Lanes, split_lanes, split_lanes_mut};
use std::ops::Range;

const UNROLL: usize = 4;

/// Columns swept by an `N`-lane strategy for pivot `line`
#[inline]
pub(crate) fn lane_columns<const N: usize>(line: usize, width: usize) -> Range<usize> {
    (line & !(N - 1))..width.div_ceil(N) * N
}

/// Reject lane widths that cannot tile the matrix rows
pub(crate) fn validate_lanes<T: Element, const N: usize>(
    name: &'static str,
    matrix: &Matrix<T>,
) -> Result<()> {
    if N == 0 || !N.is_power_of_two() {
        return Err(Error::invalid_argument(
            "lanes",
            format!("{name}: {N} is not a power of two"),
        ));
    }
    let bytes = N * std::mem::size_of::<T>();
    if bytes > crate::buffer::ALIGNMENT {
        return Err(Error::invalid_argument(
            "lanes",
            format!(
                "{name}: {N} x {} is {bytes} bytes, wider than a {}-byte row block",
                T::DTYPE,
                crate::buffer::ALIGNMENT
            ),
        ));
    }
    if matrix.stride() % N != 0 {
        return Err(Error::invalid_argument(
            "lanes",
            format!("{name}: {N} does not divide row stride {}", matrix.stride()),
        ));
    }
    Ok(())
}

#[inline(always)]
fn fma_factor<T: Element>(base: T, target: &mut T, scale: T) {
    *target = (-scale).mul_add(base, *target);
}

/// `N` columns per step as `target = fma(-scale, base, target)`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Vector<const N: usize>;

impl<T: Element, const N: usize> RowUpdate<T> for Vector<N> {
    fn name(&self) -> &'static str {
        "vector"
    }

    #[inline]
    fn columns(&self, line: usize, width: usize) -> Range<usize> {
        lane_columns::<N>(line, width)
    }

    fn validate(&self, matrix: &Matrix<T>) -> Result<()> {
        validate_lanes::<T, N>("vector", matrix)
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let neg = Lanes::<T, N>::splat(-scale);
        let (b_lanes, b_tail) = split_lanes::<T, N>(base);
        let (t_lanes, t_tail) = split_lanes_mut::<T, N>(target);

        for (t, b) in t_lanes.iter_mut().zip(b_lanes) {
            neg.mul_add(Lanes::load(b), Lanes::load(t)).store(t);
        }
        for (t, &b) in t_tail.iter_mut().zip(b_tail) {
            fma_factor(b, t, scale);
        }
    }

    #[inline]
    fn update_factor(&self, base: T, target: &mut T, scale: T) {
        fma_factor(base, target, scale);
    }
}

/// [`Vector`] with four lanes per iteration and a single-lane tail
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct UnrolledVector<const N: usize>;

impl<T: Element, const N: usize> RowUpdate<T> for UnrolledVector<N> {
    fn name(&self) -> &'static str {
        "unrolled-vector"
    }

    #[inline]
    fn columns(&self, line: usize, width: usize) -> Range<usize> {
        lane_columns::<N>(line, width)
    }

    fn validate(&self, matrix: &Matrix<T>) -> Result<()> {
        validate_lanes::<T, N>("unrolled-vector", matrix)
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let neg = Lanes::<T, N>::splat(-scale);
        let (b_lanes, b_tail) = split_lanes::<T, N>(base);
        let (t_lanes, t_tail) = split_lanes_mut::<T, N>(target);

        let mut t_blocks = t_lanes.chunks_exact_mut(UNROLL);
        let mut b_blocks = b_lanes.chunks_exact(UNROLL);
        for (t, b) in (&mut t_blocks).zip(&mut b_blocks) {
            let r0 = neg.mul_add(Lanes::load(&b[0]), Lanes::load(&t[0]));
            let r1 = neg.mul_add(Lanes::load(&b[1]), Lanes::load(&t[1]));
            let r2 = neg.mul_add(Lanes::load(&b[2]), Lanes::load(&t[2]));
            let r3 = neg.mul_add(Lanes::load(&b[3]), Lanes::load(&t[3]));
            r0.store(&mut t[0]);
            r1.store(&mut t[1]);
            r2.store(&mut t[2]);
            r3.store(&mut t[3]);
        }

        for (t, b) in t_blocks
            .into_remainder()
            .iter_mut()
            .zip(b_blocks.remainder())
        {
            neg.mul_add(Lanes::load(b), Lanes::load(t)).store(t);
        }
        for (t, &b) in t_tail.iter_mut().zip(b_tail) {
            fma_factor(b, t, scale);
        }
    }

    #[inline]
    fn update_factor(&self, base: T, target: &mut T, scale: T) {
        fma_factor(base, target, scale);
    }
}
