//! Four-column unrolled row update

use super::RowUpdate;
use crate::dtype::Element;

const UNROLL: usize = 4;

/// Scalar update processing four columns per iteration
///
/// The operations and their order per column are those of
/// [`Scalar`](super::Scalar), so results are bit-identical; only the loop
/// trip count changes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Unrolled;

impl<T: Element> RowUpdate<T> for Unrolled {
    fn name(&self) -> &'static str {
        "unrolled"
    }

    #[inline]
    fn update_row(&self, base: &[T], target: &mut [T], scale: T) {
        let n = base.len().min(target.len());
        let (base, target) = (&base[..n], &mut target[..n]);

        let mut t_blocks = target.chunks_exact_mut(UNROLL);
        let mut b_blocks = base.chunks_exact(UNROLL);
        for (t, b) in (&mut t_blocks).zip(&mut b_blocks) {
            t[0] = t[0] - scale * b[0];
            t[1] = t[1] - scale * b[1];
            t[2] = t[2] - scale * b[2];
            t[3] = t[3] - scale * b[3];
        }

        for (t, &b) in t_blocks
            .into_remainder()
            .iter_mut()
            .zip(b_blocks.remainder())
        {
            *t = *t - scale * b;
        }
    }
}
