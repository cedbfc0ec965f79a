//! Dense square matrix with lane-padded, 64-byte aligned rows

use super::{AlignedBuffer, padded_len};
use crate::dtype::Element;
use crate::error::{Error, Result};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Dense `width x width` row-major matrix
///
/// Rows are stored `stride` elements apart, where `stride` is `width` rounded
/// up to a whole 64-byte block. The `stride - width` trailing columns of every
/// row are zero padding: they keep lane-wide sweeps inside the row and are
/// never returned by [`Matrix::row`], [`Matrix::get`] or
/// [`Matrix::to_row_major`].
#[derive(Clone)]
pub struct Matrix<T: Element> {
    data: AlignedBuffer<T>,
    width: usize,
    stride: usize,
}

impl<T: Element> Matrix<T> {
    /// Create a zero matrix
    pub fn zeros(width: usize) -> Result<Self> {
        let stride = padded_len::<T>(width)?;
        let len = width.checked_mul(stride).ok_or_else(|| {
            Error::invalid_argument("width", format!("{width}x{stride} overflows usize"))
        })?;
        Ok(Self {
            data: AlignedBuffer::zeros(len)?,
            width,
            stride,
        })
    }

    /// Create a matrix from `width * width` row-major values
    pub fn from_row_major(width: usize, values: &[T]) -> Result<Self> {
        let expected = width.checked_mul(width).ok_or_else(|| {
            Error::invalid_argument("width", format!("{width}x{width} overflows usize"))
        })?;
        if values.len() != expected {
            return Err(Error::shape_mismatch(&[expected], &[values.len()]));
        }

        let mut matrix = Self::zeros(width)?;
        if width > 0 {
            for (dst, src) in matrix
                .data
                .chunks_exact_mut(matrix.stride)
                .zip(values.chunks_exact(width))
            {
                dst[..width].copy_from_slice(src);
            }
        }
        Ok(matrix)
    }

    /// Create a matrix from a list of rows
    pub fn from_rows(rows: &[Vec<T>]) -> Result<Self> {
        let width = rows.len();
        let mut matrix = Self::zeros(width)?;
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::shape_mismatch(&[width, width], &[y, row.len()]));
            }
            matrix.row_mut(y).copy_from_slice(row);
        }
        Ok(matrix)
    }

    /// Copy the logical contents out as a dense row-major vector
    pub fn to_row_major(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.width * self.width);
        for y in 0..self.width {
            out.extend_from_slice(self.row(y));
        }
        out
    }

    /// Number of rows (and columns)
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Distance in elements between the starts of consecutive rows
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns true for the 0x0 matrix
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }

    /// Element at `(row, col)`
    ///
    /// # Panics
    /// If `row` or `col` is not below `width`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self[(row, col)]
    }

    /// Overwrite the element at `(row, col)`
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self[(row, col)] = value;
    }

    /// Logical columns of row `y`
    #[inline]
    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.width]
    }

    /// Mutable logical columns of row `y`
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.stride;
        &mut self.data[start..start + self.width]
    }

    /// Row `y` including its zero padding
    #[inline]
    pub fn padded_row(&self, y: usize) -> &[T] {
        let start = y * self.stride;
        &self.data[start..start + self.stride]
    }

    /// Whole backing store, `width * stride` elements
    #[inline]
    pub fn as_padded_slice(&self) -> &[T] {
        &self.data
    }

    /// Mutable whole backing store, `width * stride` elements
    #[inline]
    pub fn as_padded_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Split into the padded pivot row `line` and all padded rows below it
    ///
    /// The pivot row is only ever read while the rows below it are written,
    /// which is what lets the rows be updated independently.
    pub(crate) fn split_at_pivot(&mut self, line: usize) -> (&[T], &mut [T]) {
        let stride = self.stride;
        let (head, tail) = self.data.split_at_mut((line + 1) * stride);
        (&head[line * stride..], tail)
    }

    /// Largest magnitude strictly below the diagonal
    ///
    /// Forward elimination drives these entries toward zero but does not
    /// write exact zeros, so this is the way to check how far they are from it.
    pub fn max_abs_below_diagonal(&self) -> T {
        let mut max = T::zero();
        for y in 1..self.width {
            for &v in &self.row(y)[..y] {
                let a = v.abs();
                if a > max || a.is_nan() {
                    max = a;
                }
            }
        }
        max
    }

    /// Returns true if every entry below the diagonal is within `tol` of zero
    pub fn is_upper_triangular(&self, tol: T) -> bool {
        let max = self.max_abs_below_diagonal();
        !max.is_nan() && max <= tol
    }

    /// Returns true if no logical element is NaN or infinite
    pub fn is_finite(&self) -> bool {
        (0..self.width).all(|y| self.row(y).iter().all(|v| v.is_finite()))
    }
}

impl<T: Element> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        assert!(
            row < self.width && col < self.width,
            "index ({row}, {col}) out of bounds for {0}x{0} matrix",
            self.width
        );
        &self.data[row * self.stride + col]
    }
}

impl<T: Element> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        assert!(
            row < self.width && col < self.width,
            "index ({row}, {col}) out of bounds for {0}x{0} matrix",
            self.width
        );
        &mut self.data[row * self.stride + col]
    }
}

impl<T: Element> fmt::Debug for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: Vec<&[T]> = (0..self.width).map(|y| self.row(y)).collect();
        f.debug_struct("Matrix")
            .field("width", &self.width)
            .field("stride", &self.stride)
            .field("rows", &rows)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ALIGNMENT;

    #[test]
    fn test_stride_and_row_alignment() {
        let m = Matrix::<f32>::zeros(5).unwrap();
        assert_eq!(m.width(), 5);
        assert_eq!(m.stride(), 16);
        assert_eq!(m.as_padded_slice().len(), 5 * 16);
        for y in 0..5 {
            assert_eq!(m.padded_row(y).as_ptr() as usize % ALIGNMENT, 0);
        }

        let m = Matrix::<f64>::zeros(8).unwrap();
        assert_eq!(m.stride(), 8);
    }

    #[test]
    fn test_row_major_roundtrip_skips_padding() {
        let values: Vec<f64> = (0..9).map(|v| v as f64).collect();
        let m = Matrix::from_row_major(3, &values).unwrap();
        assert_eq!(m.row(1), &[3.0, 4.0, 5.0]);
        assert_eq!(m[(2, 1)], 7.0);
        assert!(m.padded_row(0)[3..].iter().all(|&v| v == 0.0));
        assert_eq!(m.to_row_major(), values);
    }

    #[test]
    fn test_from_row_major_rejects_wrong_length() {
        let err = Matrix::<f32>::from_row_major(3, &[1.0; 8]).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        let rows = vec![vec![1.0f32, 2.0], vec![3.0]];
        assert!(Matrix::from_rows(&rows).is_err());
    }

    #[test]
    fn test_empty_matrix() {
        let m = Matrix::<f32>::from_row_major(0, &[]).unwrap();
        assert!(m.is_empty());
        assert!(m.to_row_major().is_empty());
        assert!(m.is_upper_triangular(0.0));
    }

    #[test]
    fn test_split_at_pivot() {
        let values: Vec<f32> = (0..9).map(|v| v as f32).collect();
        let mut m = Matrix::from_row_major(3, &values).unwrap();
        let stride = m.stride();
        let (pivot, rest) = m.split_at_pivot(1);
        assert_eq!(&pivot[..3], &[3.0, 4.0, 5.0]);
        assert_eq!(pivot.len(), stride);
        assert_eq!(rest.len(), stride);
        assert_eq!(&rest[..3], &[6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_below_diagonal_checks() {
        let mut m = Matrix::from_rows(&[vec![2.0f64, 1.0], vec![1e-9, 3.0]]).unwrap();
        assert!(m.is_upper_triangular(1e-6));
        assert!(!m.is_upper_triangular(1e-12));
        m.set(1, 0, f64::NAN);
        assert!(!m.is_upper_triangular(1.0));
        assert!(!m.is_finite());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_index_into_padding_panics() {
        let m = Matrix::<f32>::zeros(3).unwrap();
        let _ = m[(0, 3)];
    }
}
