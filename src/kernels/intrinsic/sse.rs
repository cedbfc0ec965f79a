//! SSE row-update kernels for x86-64
//!
//! SSE is part of the x86-64 baseline, so these never need a runtime check.
//! Rows of a [`Matrix`](crate::buffer::Matrix) are 64-byte aligned and the
//! sweep starts on a 4-column boundary, which lets the driver's calls take the
//! aligned load/store path; arbitrary slices fall back to unaligned access.

use std::arch::x86_64::*;

use super::{F32_LANES, sub_scaled_scalar_f32};

const UNROLL_COLS: usize = 4 * F32_LANES;
const ALIGN: usize = 16;

#[inline(always)]
fn is_aligned(p: *const f32) -> bool {
    (p as usize) % ALIGN == 0
}

#[inline(always)]
unsafe fn load<const ALIGNED: bool>(p: *const f32) -> __m128 {
    if ALIGNED {
        _mm_load_ps(p)
    } else {
        _mm_loadu_ps(p)
    }
}

#[inline(always)]
unsafe fn store<const ALIGNED: bool>(p: *mut f32, v: __m128) {
    if ALIGNED {
        _mm_store_ps(p, v)
    } else {
        _mm_storeu_ps(p, v)
    }
}

/// `target[i] -= scale * base[i]`, four columns at a time
///
/// # Safety
/// - `base` must be valid for `len` reads and `target` for `len` writes
#[target_feature(enable = "sse")]
pub unsafe fn sub_scaled_f32(base: *const f32, target: *mut f32, scale: f32, len: usize) {
    if is_aligned(base) && is_aligned(target) {
        sub_scaled_lanes::<true>(base, target, scale, len);
    } else {
        sub_scaled_lanes::<false>(base, target, scale, len);
    }
}

/// `target[i] -= scale * base[i]`, sixteen columns per iteration
///
/// # Safety
/// - `base` must be valid for `len` reads and `target` for `len` writes
#[target_feature(enable = "sse")]
pub unsafe fn sub_scaled_unrolled_f32(base: *const f32, target: *mut f32, scale: f32, len: usize) {
    if is_aligned(base) && is_aligned(target) {
        sub_scaled_unrolled::<true>(base, target, scale, len);
    } else {
        sub_scaled_unrolled::<false>(base, target, scale, len);
    }
}

#[target_feature(enable = "sse")]
unsafe fn sub_scaled_lanes<const ALIGNED: bool>(
    base: *const f32,
    target: *mut f32,
    scale: f32,
    len: usize,
) {
    let vscale = _mm_set1_ps(scale);
    let chunks = len / F32_LANES;

    for i in 0..chunks {
        let offset = i * F32_LANES;
        let vb = load::<ALIGNED>(base.add(offset));
        let vt = load::<ALIGNED>(target.add(offset));
        store::<ALIGNED>(target.add(offset), _mm_sub_ps(vt, _mm_mul_ps(vscale, vb)));
    }

    let done = chunks * F32_LANES;
    sub_scaled_scalar_f32(base.add(done), target.add(done), scale, len - done);
}

#[target_feature(enable = "sse")]
unsafe fn sub_scaled_unrolled<const ALIGNED: bool>(
    base: *const f32,
    target: *mut f32,
    scale: f32,
    len: usize,
) {
    let vscale = _mm_set1_ps(scale);
    let blocks = len / UNROLL_COLS;

    for i in 0..blocks {
        let b = base.add(i * UNROLL_COLS);
        let t = target.add(i * UNROLL_COLS);

        let b0 = load::<ALIGNED>(b);
        let b1 = load::<ALIGNED>(b.add(4));
        let b2 = load::<ALIGNED>(b.add(8));
        let b3 = load::<ALIGNED>(b.add(12));
        let t0 = load::<ALIGNED>(t);
        let t1 = load::<ALIGNED>(t.add(4));
        let t2 = load::<ALIGNED>(t.add(8));
        let t3 = load::<ALIGNED>(t.add(12));

        store::<ALIGNED>(t, _mm_sub_ps(t0, _mm_mul_ps(vscale, b0)));
        store::<ALIGNED>(t.add(4), _mm_sub_ps(t1, _mm_mul_ps(vscale, b1)));
        store::<ALIGNED>(t.add(8), _mm_sub_ps(t2, _mm_mul_ps(vscale, b2)));
        store::<ALIGNED>(t.add(12), _mm_sub_ps(t3, _mm_mul_ps(vscale, b3)));
    }

    let done = blocks * UNROLL_COLS;
    sub_scaled_lanes::<ALIGNED>(base.add(done), target.add(done), scale, len - done);
}
