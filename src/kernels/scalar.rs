//! Reference row updates

use super::RowUpdate;
use crate::dtype::Element;

/// Indexed column loop, the reference result for every other strategy
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Scalar;

impl<T: Element> RowUpdate<T> for Scalar {
    fn name(&self) -> &'static str {
        "scalar"
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let n = base.len().min(target.len());
        for x in 0..n {
            target[x] = target[x] - scale * base[x];
        }
    }
}

/// Iterator walk over both rows
///
/// Same arithmetic in the same order as [`Scalar`], without index bounds
/// checks, leaving vectorization to the compiler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Zipped;

impl<T: Element> RowUpdate<T> for Zipped {
    fn name(&self) -> &'static str {
        "zipped"
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        for (t, &b) in target.iter_mut().zip(base) {
            *t = *t - scale * b;
        }
    }
}
