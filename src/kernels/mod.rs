//! Forward elimination driver and row-update strategies
//!
//! Every strategy runs the same loop nest:
//!
//! ```text
//! for line in 0..width-1:
//!     for y in line+1..width:
//!         scale      = M[y][line] / M[line][line]
//!         factor[y] -= scale * factor[line]
//!         M[y][cols] -= scale * M[line][cols]
//! ```
//!
//! and differs only in how the last line is carried out. That piece is the
//! [`RowUpdate`] trait; [`forward_eliminate`] owns the loop nest.
//!
//! Pivots are not checked. A zero pivot yields infinities or NaN that
//! propagate through the remaining rows.

#![allow(unsafe_op_in_unsafe_fn)] // Intrinsic kernels are already marked unsafe, inner unsafe is redundant

pub mod intrinsic;
pub mod scalar;
pub mod unrolled;
pub mod vector;

pub use intrinsic::{Intrinsic, UnrolledIntrinsic};
pub use scalar::{Scalar, Zipped};
pub use unrolled::Unrolled;
pub use vector::{UnrolledVector, Vector};

use crate::buffer::Matrix;
use crate::dtype::Element;
use crate::error::{Error, Result};
use std::ops::Range;

/// One way of applying `target -= scale * base` to a row
///
/// Implementations must only write inside `target` and must treat a call as
/// independent of every other row, so the driver may run rows of the same
/// pivot line in any order or concurrently.
pub trait RowUpdate<T: Element>: Send + Sync {
    /// Short kebab-case name used in logs
    fn name(&self) -> &'static str;

    /// Columns swept for pivot `line` in a matrix of `width` columns
    ///
    /// Lane strategies start below `line` and end past `width`; the driver
    /// hands them the padded row so those columns exist.
    #[inline]
    fn columns(&self, line: usize, width: usize) -> Range<usize> {
        line..width
    }

    /// Reject matrices this strategy cannot sweep
    ///
    /// Called once before any element is written.
    fn validate(&self, matrix: &Matrix<T>) -> Result<()> {
        let width = matrix.width();
        if width == 0 {
            return Ok(());
        }
        let end = self.columns(0, width).end;
        if end > matrix.stride() {
            return Err(Error::invalid_argument(
                "matrix",
                format!(
                    "strategy '{}' sweeps {end} columns but rows hold {}",
                    self.name(),
                    matrix.stride()
                ),
            ));
        }
        Ok(())
    }

    /// `target[i] -= scale * base[i]` for every `i`
    ///
    /// `base` and `target` are the same column range of the pivot row and of
    /// the row being reduced and have equal length.
    fn update_row(&self, base: &[T], target: &mut [T], scale: T);

    /// `target -= scale * base` on the right-hand side
    #[inline]
    fn update_factor(&self, base: T, target: &mut T, scale: T) {
        *target = *target - scale * base;
    }

    /// Reduce `matrix` and `factor` in place using this strategy
    fn eliminate(&self, matrix: &mut Matrix<T>, factor: &mut [T]) -> Result<()>
    where
        Self: Sized,
    {
        forward_eliminate(self, matrix, factor)
    }
}

/// Check that `factor` pairs with `matrix` and that `update` can sweep it
pub(crate) fn check_system<T: Element, U: RowUpdate<T> + ?Sized>(
    update: &U,
    matrix: &Matrix<T>,
    factor: &[T],
) -> Result<()> {
    if factor.len() != matrix.width() {
        return Err(Error::shape_mismatch(&[matrix.width()], &[factor.len()]));
    }
    update.validate(matrix)
}

/// In-place forward elimination without pivoting
///
/// After the call, row `line` holds the `line`-th pivot row of the reduced
/// system for every `line`, and `factor` holds the matching right-hand side.
/// Columns left of the diagonal are driven toward zero but are not written
/// as exact zeros; compare with [`Matrix::max_abs_below_diagonal`] or read
/// only the upper triangle.
///
/// # Errors
/// - [`Error::ShapeMismatch`] if `factor.len() != matrix.width()`
/// - [`Error::InvalidArgument`] if the strategy cannot sweep the matrix rows
///
/// Nothing is written when an error is returned.
pub fn forward_eliminate<T: Element, U: RowUpdate<T> + ?Sized>(
    update: &U,
    matrix: &mut Matrix<T>,
    factor: &mut [T],
) -> Result<()> {
    check_system(update, matrix, factor)?;

    let width = matrix.width();
    let stride = matrix.stride();
    let dtype = T::DTYPE;
    tracing::debug!(
        strategy = update.name(),
        %dtype,
        width,
        stride,
        "forward elimination"
    );

    for line in 0..width.saturating_sub(1) {
        tracing::trace!(line, "pivot line");
        let cols = update.columns(line, width);
        let (pivot_row, rows) = matrix.split_at_pivot(line);
        let (f_head, f_rows) = factor.split_at_mut(line + 1);
        let pivot_factor = f_head[line];

        for (row, f) in rows.chunks_exact_mut(stride).zip(f_rows.iter_mut()) {
            eliminate_row(update, line, &cols, pivot_row, pivot_factor, row, f);
        }
    }
    Ok(())
}

/// Reduce one row against the pivot row of `line`
#[inline(always)]
pub(crate) fn eliminate_row<T: Element, U: RowUpdate<T> + ?Sized>(
    update: &U,
    line: usize,
    cols: &Range<usize>,
    pivot_row: &[T],
    pivot_factor: T,
    row: &mut [T],
    factor: &mut T,
) {
    let scale = row[line] / pivot_row[line];
    update.update_factor(pivot_factor, factor, scale);
    update.update_row(&pivot_row[cols.clone()], &mut row[cols.clone()], scale);
}
