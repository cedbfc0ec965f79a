//! Common test utilities
#![allow(dead_code)]

use elimr::buffer::Matrix;
use elimr::dtype::Element;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The 3x3 system with a hand-checked reduction
pub fn sample_system<T: Element>() -> (Matrix<T>, Vec<T>) {
    let rows = [[4.0, 1.0, 2.0], [2.0, 3.0, 1.0], [1.0, 1.0, 5.0]];
    let rows: Vec<Vec<T>> = rows
        .iter()
        .map(|r| r.iter().map(|&v| T::from_f64(v)).collect())
        .collect();
    let factor = [1.0, 2.0, 3.0].iter().map(|&v| T::from_f64(v)).collect();
    (Matrix::from_rows(&rows).unwrap(), factor)
}

/// Upper triangle (including the diagonal) and factor of the reduced sample system
pub const SAMPLE_UPPER: [f64; 6] = [4.0, 1.0, 2.0, 2.5, 0.0, 4.5];
pub const SAMPLE_FACTOR: [f64; 3] = [1.0, 1.5, 2.3];

/// Seeded, strictly diagonally dominant system, so no pivot is near zero
pub fn random_system<T: Element>(width: usize, seed: u64) -> (Matrix<T>, Vec<T>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values = Vec::with_capacity(width * width);
    for y in 0..width {
        for x in 0..width {
            let v = if x == y {
                width as f64 + rng.random_range(1.0..2.0)
            } else {
                rng.random_range(-1.0..1.0)
            };
            values.push(T::from_f64(v));
        }
    }
    let factor = (0..width)
        .map(|_| T::from_f64(rng.random_range(-10.0..10.0)))
        .collect();
    (Matrix::from_row_major(width, &values).unwrap(), factor)
}

/// Upper-triangular system (zeros below the diagonal)
pub fn triangular_system<T: Element>(width: usize, seed: u64) -> (Matrix<T>, Vec<T>) {
    let (mut m, f) = random_system::<T>(width, seed);
    for y in 1..width {
        for x in 0..y {
            m.set(y, x, T::zero());
        }
    }
    (m, f)
}

/// Entries with `col >= row`, row by row, as f64
///
/// Columns left of the diagonal hold strategy-dependent residues, so
/// comparisons between strategies only look at this part.
pub fn upper_triangle<T: Element>(m: &Matrix<T>) -> Vec<f64> {
    let mut out = Vec::with_capacity(m.width() * (m.width() + 1) / 2);
    for y in 0..m.width() {
        out.extend(m.row(y)[y..].iter().map(|&v| Element::to_f64(v)));
    }
    out
}

/// Factor as f64
pub fn to_f64<T: Element>(values: &[T]) -> Vec<f64> {
    values.iter().map(|&v| Element::to_f64(v)).collect()
}

/// Assert two f64 slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose_f64(a: &[f64], b: &[f64], rtol: f64, atol: f64, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert two f32 slices are close within tolerance
pub fn assert_allclose_f32(a: &[f32], b: &[f32], rtol: f32, atol: f32, msg: &str) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (x - y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Assert the upper triangle and factor of two reduced systems agree
pub fn assert_system_close<T: Element>(
    actual: (&Matrix<T>, &[T]),
    expected: (&Matrix<T>, &[T]),
    msg: &str,
) {
    let rtol = T::DTYPE.default_rtol();
    let atol = rtol * 10.0;
    assert_allclose_f64(
        &upper_triangle(actual.0),
        &upper_triangle(expected.0),
        rtol,
        atol,
        &format!("{msg}: matrix"),
    );
    assert_allclose_f64(
        &to_f64(actual.1),
        &to_f64(expected.1),
        rtol,
        atol,
        &format!("{msg}: factor"),
    );
}
