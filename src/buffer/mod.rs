//! Aligned, explicitly padded storage for the elimination kernels
//!
//! Every vectorized strategy sweeps whole lanes, so the last load/store of a
//! row may reach past the logical width. The storage here makes that padding
//! real: it is allocated, zero-filled and addressable through ordinary slices,
//! rather than relying on spare allocator capacity.
//!
//! ```text
//! stride = round_up(width, ALIGNMENT / size_of::<T>())
//!
//! row 0: | c0 c1 ... c(w-1) | 0 0 0 |   <- starts on a 64-byte boundary
//! row 1: | c0 c1 ... c(w-1) | 0 0 0 |
//! ```

mod aligned;
mod matrix;

pub use aligned::AlignedBuffer;
pub use matrix::Matrix;

use crate::error::{Error, Result};

/// Byte alignment of every buffer and every matrix row (one AVX-512 register)
pub const ALIGNMENT: usize = 64;

/// Number of `T` values in one [`ALIGNMENT`]-sized block
#[inline]
pub const fn block_elements<T>() -> usize {
    ALIGNMENT / std::mem::size_of::<T>()
}

/// Round `n` up to the next multiple of `multiple`
///
/// Returns `None` on overflow. `multiple` must be non-zero.
#[inline]
pub const fn round_up(n: usize, multiple: usize) -> Option<usize> {
    match n.checked_add(multiple - 1) {
        Some(v) => Some(v / multiple * multiple),
        None => None,
    }
}

/// Length of `len` elements rounded up to whole alignment blocks
pub fn padded_len<T>(len: usize) -> Result<usize> {
    round_up(len, block_elements::<T>())
        .ok_or_else(|| Error::invalid_argument("len", format!("{len} elements overflow usize")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_up() {
        assert_eq!(round_up(0, 4), Some(0));
        assert_eq!(round_up(1, 4), Some(4));
        assert_eq!(round_up(4, 4), Some(4));
        assert_eq!(round_up(5, 16), Some(16));
        assert_eq!(round_up(usize::MAX, 16), None);
    }

    #[test]
    fn test_padded_len() {
        assert_eq!(block_elements::<f32>(), 16);
        assert_eq!(block_elements::<f64>(), 8);
        assert_eq!(padded_len::<f32>(3).unwrap(), 16);
        assert_eq!(padded_len::<f64>(9).unwrap(), 16);
        assert!(padded_len::<f32>(usize::MAX).is_err());
    }
}
