//! NEON row-update kernels for ARM64
//!
//! NEON is the baseline SIMD instruction set for all ARM64 processors.
//! `vld1q_f32`/`vst1q_f32` have no alignment requirement, so one path serves
//! both padded matrix rows and arbitrary slices.

use std::arch::aarch64::*;

use super::{F32_LANES, sub_scaled_scalar_f32};

const UNROLL_COLS: usize = 4 * F32_LANES;

/// `target[i] -= scale * base[i]`, four columns at a time
///
/// # Safety
/// - CPU must support NEON (always true on AArch64)
/// - `base` must be valid for `len` reads and `target` for `len` writes
#[target_feature(enable = "neon")]
pub unsafe fn sub_scaled_f32(base: *const f32, target: *mut f32, scale: f32, len: usize) {
    let vscale = vdupq_n_f32(scale);
    let chunks = len / F32_LANES;

    for i in 0..chunks {
        let offset = i * F32_LANES;
        let vb = vld1q_f32(base.add(offset));
        let vt = vld1q_f32(target.add(offset));
        vst1q_f32(target.add(offset), vsubq_f32(vt, vmulq_f32(vscale, vb)));
    }

    let done = chunks * F32_LANES;
    sub_scaled_scalar_f32(base.add(done), target.add(done), scale, len - done);
}

/// `target[i] -= scale * base[i]`, sixteen columns per iteration
///
/// # Safety
/// - CPU must support NEON (always true on AArch64)
/// - `base` must be valid for `len` reads and `target` for `len` writes
#[target_feature(enable = "neon")]
pub unsafe fn sub_scaled_unrolled_f32(base: *const f32, target: *mut f32, scale: f32, len: usize) {
    let vscale = vdupq_n_f32(scale);
    let blocks = len / UNROLL_COLS;

    for i in 0..blocks {
        let b = base.add(i * UNROLL_COLS);
        let t = target.add(i * UNROLL_COLS);

        let b0 = vld1q_f32(b);
        let b1 = vld1q_f32(b.add(4));
        let b2 = vld1q_f32(b.add(8));
        let b3 = vld1q_f32(b.add(12));
        let t0 = vld1q_f32(t);
        let t1 = vld1q_f32(t.add(4));
        let t2 = vld1q_f32(t.add(8));
        let t3 = vld1q_f32(t.add(12));

        vst1q_f32(t, vsubq_f32(t0, vmulq_f32(vscale, b0)));
        vst1q_f32(t.add(4), vsubq_f32(t1, vmulq_f32(vscale, b1)));
        vst1q_f32(t.add(8), vsubq_f32(t2, vmulq_f32(vscale, b2)));
        vst1q_f32(t.add(12), vsubq_f32(t3, vmulq_f32(vscale, b3)));
    }

    let done = blocks * UNROLL_COLS;
    sub_scaled_f32(base.add(done), target.add(done), scale, len - done);
}
