//! Integration tests for serial forward elimination across strategies

mod common;

use common::{
    SAMPLE_FACTOR, SAMPLE_UPPER, assert_allclose_f32, assert_allclose_f64, assert_system_close,
    random_system, sample_system, to_f64, triangular_system, upper_triangle,
};
use elimr::prelude::*;

/// Every concrete strategy that runs on `dtype`, with the lane widths that fit it
fn eliminators(dtype: DType) -> Vec<Eliminator> {
    let mut out = Vec::new();
    for strategy in Strategy::ALL {
        if !strategy.supports(dtype) {
            continue;
        }
        if matches!(strategy, Strategy::Vector | Strategy::UnrolledVector) {
            for lanes in [1, 2, 4, 8, 16] {
                if lanes * dtype.size_in_bytes() > 64 {
                    continue;
                }
                let config = EliminationConfig::default()
                    .with_strategy(strategy)
                    .with_lanes(lanes);
                out.push(Eliminator::new(config).unwrap());
            }
            continue;
        }
        // Intrinsic strategies only exist on SSE/NEON targets
        if let Ok(e) = Eliminator::new(EliminationConfig::default().with_strategy(strategy)) {
            out.push(e);
        }
    }
    out.push(Eliminator::new(EliminationConfig::default()).unwrap());
    out
}

fn label(e: &Eliminator, dtype: DType) -> String {
    let (strategy, lanes) = e.resolve(dtype);
    format!("{strategy}/{lanes}/{dtype}")
}

// ============================================================================
// Concrete scenario
// ============================================================================

#[test]
fn test_sample_system_f32_all_strategies() {
    for e in eliminators(DType::F32) {
        let (mut m, mut f) = sample_system::<f32>();
        e.eliminate(&mut m, &mut f).unwrap();

        let upper: Vec<f32> = upper_triangle(&m).iter().map(|&v| v as f32).collect();
        let expected: Vec<f32> = SAMPLE_UPPER.iter().map(|&v| v as f32).collect();
        let name = label(&e, DType::F32);
        assert_allclose_f32(&upper, &expected, 1e-4, 1e-4, &name);
        let factor: Vec<f32> = SAMPLE_FACTOR.iter().map(|&v| v as f32).collect();
        assert_allclose_f32(&f, &factor, 1e-4, 1e-4, &name);
    }
}

#[test]
fn test_sample_system_f64_all_strategies() {
    for e in eliminators(DType::F64) {
        let (mut m, mut f) = sample_system::<f64>();
        e.eliminate(&mut m, &mut f).unwrap();

        let name = label(&e, DType::F64);
        assert_allclose_f64(&upper_triangle(&m), &SAMPLE_UPPER, 1e-12, 1e-12, &name);
        assert_allclose_f64(&f, &SAMPLE_FACTOR, 1e-12, 1e-12, &name);
    }
}

#[test]
fn test_sample_system_through_trait() {
    let (mut m, mut f) = sample_system::<f64>();
    Unrolled.eliminate(&mut m, &mut f).unwrap();
    assert_eq!(m.row(0), &[4.0, 1.0, 2.0]);
    assert_allclose_f64(&upper_triangle(&m), &SAMPLE_UPPER, 1e-12, 1e-12, "unrolled");
}

// ============================================================================
// Cross-strategy equivalence
// ============================================================================

fn check_equivalence<T: Element>(width: usize, seed: u64) {
    let (mut expected, mut f_expected) = random_system::<T>(width, seed);
    forward_eliminate(&Scalar, &mut expected, &mut f_expected).unwrap();

    for e in eliminators(T::DTYPE) {
        let (mut m, mut f) = random_system::<T>(width, seed);
        e.eliminate(&mut m, &mut f).unwrap();
        assert_system_close(
            (&m, &f[..]),
            (&expected, &f_expected[..]),
            &format!("{} width {width}", label(&e, T::DTYPE)),
        );
    }
}

#[test]
fn test_strategies_agree_f32() {
    for (width, seed) in [(2, 1), (7, 2), (16, 3), (33, 4), (64, 5), (101, 6)] {
        check_equivalence::<f32>(width, seed);
    }
}

#[test]
fn test_strategies_agree_f64() {
    for (width, seed) in [(3, 11), (8, 12), (17, 13), (50, 14), (97, 15)] {
        check_equivalence::<f64>(width, seed);
    }
}

#[test]
fn test_reference_strategies_are_bit_exact() {
    for width in [5, 16, 29] {
        let (mut expected, mut f_expected) = random_system::<f32>(width, 42);
        forward_eliminate(&Scalar, &mut expected, &mut f_expected).unwrap();

        for strategy in Strategy::ALL.into_iter().filter(|s| s.is_bit_exact()) {
            let e = Eliminator::new(EliminationConfig::default().with_strategy(strategy)).unwrap();
            let (mut m, mut f) = random_system::<f32>(width, 42);
            e.eliminate(&mut m, &mut f).unwrap();
            assert_eq!(m.to_row_major(), expected.to_row_major(), "{strategy}");
            assert_eq!(f, f_expected, "{strategy}");
        }
    }
}

#[test]
fn test_intrinsic_upper_triangle_is_bit_exact() {
    let Ok(intrinsic) = UnrolledIntrinsic::new() else {
        return;
    };
    let (mut expected, mut f_expected) = random_system::<f32>(45, 7);
    forward_eliminate(&Scalar, &mut expected, &mut f_expected).unwrap();

    let (mut m, mut f) = random_system::<f32>(45, 7);
    intrinsic.eliminate(&mut m, &mut f).unwrap();
    assert_eq!(upper_triangle(&m), upper_triangle(&expected));
    assert_eq!(f, f_expected);
}

#[test]
fn test_deterministic_across_runs() {
    for strategy in [Strategy::Scalar, Strategy::Unrolled, Strategy::UnrolledVector] {
        let e = Eliminator::new(EliminationConfig::default().with_strategy(strategy)).unwrap();
        let run = || {
            let (mut m, mut f) = random_system::<f64>(40, 99);
            e.eliminate(&mut m, &mut f).unwrap();
            (m.to_row_major(), f)
        };
        assert_eq!(run(), run(), "{strategy}");
    }
}

// ============================================================================
// Padding and widths
// ============================================================================

#[test]
fn test_widths_around_lane_boundaries() {
    for width in [1, 3, 4, 5, 15, 16, 17, 31, 33] {
        check_equivalence::<f32>(width, width as u64);
        check_equivalence::<f64>(width, width as u64 + 100);
    }
}

#[test]
fn test_padding_remains_zero_after_lane_sweeps() {
    for e in eliminators(DType::F32) {
        let (mut m, mut f) = random_system::<f32>(13, 21);
        e.eliminate(&mut m, &mut f).unwrap();
        for y in 0..m.width() {
            assert!(
                m.padded_row(y)[m.width()..].iter().all(|&v| v == 0.0),
                "{} row {y}",
                label(&e, DType::F32)
            );
        }
    }
}

#[test]
fn test_below_diagonal_is_reduced() {
    let (mut m, mut f) = random_system::<f64>(24, 5);
    forward_eliminate(&Scalar, &mut m, &mut f).unwrap();
    assert!(m.is_upper_triangular(1e-9), "{}", m.max_abs_below_diagonal());
}

#[test]
fn test_width_zero_and_one() {
    for e in eliminators(DType::F32) {
        let mut m = Matrix::<f32>::zeros(0).unwrap();
        let mut f: Vec<f32> = Vec::new();
        e.eliminate(&mut m, &mut f).unwrap();

        let mut m = Matrix::from_rows(&[vec![3.0f32]]).unwrap();
        let mut f = vec![2.0f32];
        e.eliminate(&mut m, &mut f).unwrap();
        assert_eq!(m.to_row_major(), vec![3.0]);
        assert_eq!(f, vec![2.0]);
    }
}

// ============================================================================
// Triangular input
// ============================================================================

#[test]
fn test_triangular_input_is_unchanged() {
    for e in eliminators(DType::F64) {
        let (mut m, mut f) = triangular_system::<f64>(19, 8);
        let (before, f_before) = (upper_triangle(&m), to_f64(&f));
        e.eliminate(&mut m, &mut f).unwrap();

        let name = label(&e, DType::F64);
        assert_allclose_f64(&upper_triangle(&m), &before, 1e-12, 1e-12, &name);
        assert_allclose_f64(&f, &f_before, 1e-12, 1e-12, &name);
    }
}

// ============================================================================
// Errors and degenerate input
// ============================================================================

#[test]
fn test_factor_length_mismatch_is_rejected() {
    for e in eliminators(DType::F32) {
        let (mut m, _) = sample_system::<f32>();
        let before = m.to_row_major();
        let mut f = vec![1.0f32, 2.0];
        let err = e.eliminate(&mut m, &mut f).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert_eq!(m.to_row_major(), before);
    }
}

#[test]
fn test_intrinsic_rejects_f64() {
    let Ok(e) = Eliminator::new(EliminationConfig::default().with_strategy(Strategy::Intrinsic))
    else {
        return;
    };
    let (mut m, mut f) = sample_system::<f64>();
    let err = e.eliminate(&mut m, &mut f).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedDType {
            dtype: DType::F64,
            ..
        }
    ));
}

#[test]
fn test_zero_pivot_propagates_nan() {
    for e in eliminators(DType::F32) {
        let mut m = Matrix::from_rows(&[
            vec![0.0f32, 1.0, 2.0],
            vec![1.0, 1.0, 1.0],
            vec![2.0, 1.0, 3.0],
        ])
        .unwrap();
        let mut f = vec![1.0f32, 1.0, 1.0];
        e.eliminate(&mut m, &mut f).unwrap();
        assert!(!m.is_finite(), "{}", label(&e, DType::F32));
        assert!(f[1..].iter().any(|v| !v.is_finite()));
    }
}
