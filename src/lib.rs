//! # elimr
//!
//! **In-place forward Gaussian elimination, one algorithm under several row-update strategies.**
//!
//! elimr reduces a dense square system `M x = f` to upper-triangular form
//! without pivoting. The loop nest is written once; how a row is updated is a
//! pluggable [`RowUpdate`](kernels::RowUpdate) strategy, and every strategy
//! can be run row-parallel.
//!
//! ## Strategies
//!
//! - **Scalar / Zipped / Unrolled**: bit-identical reference loops
//! - **Vector / UnrolledVector**: portable `N`-lane sweeps with fused multiply-add
//! - **Intrinsic / UnrolledIntrinsic**: SSE (x86-64) or NEON (ARM64), f32 only
//! - **ParallelDispatch**: any of the above with the rows of each pivot line
//!   spread over a rayon thread pool
//!
//! Matrices live in [`Matrix`](buffer::Matrix), whose rows are 64-byte aligned
//! and zero-padded to whole lanes, so lane-wide sweeps never leave the row.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use elimr::prelude::*;
//!
//! let mut m = Matrix::from_rows(&[
//!     vec![4.0f32, 1.0, 2.0],
//!     vec![2.0, 3.0, 1.0],
//!     vec![1.0, 1.0, 5.0],
//! ])?;
//! let mut f = vec![1.0f32, 2.0, 3.0];
//!
//! let eliminator = Eliminator::new(EliminationConfig::default())?;
//! eliminator.eliminate(&mut m, &mut f)?;
//! // m = [[4, 1, 2], [_, 2.5, 0], [_, _, 4.5]], f = [1, 1.5, 2.3]
//! ```
//!
//! Entries below the diagonal are not written as exact zeros; read the upper
//! triangle or use [`Matrix::max_abs_below_diagonal`](buffer::Matrix::max_abs_below_diagonal).
//!
//! ## Feature Flags
//!
//! - `rayon` (default): row-parallel dispatch

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod dtype;
pub mod eliminator;
pub mod error;
pub mod kernels;
#[cfg(feature = "rayon")]
pub mod parallel;
pub mod simd;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::buffer::{AlignedBuffer, Matrix};
    pub use crate::dtype::{DType, Element};
    pub use crate::eliminator::{EliminationConfig, Eliminator, Strategy};
    pub use crate::error::{Error, Result};
    pub use crate::kernels::{
        Intrinsic, RowUpdate, Scalar, Unrolled, UnrolledIntrinsic, UnrolledVector, Vector, Zipped,
        forward_eliminate,
    };
    pub use crate::simd::{SimdLevel, detect_simd};

    #[cfg(feature = "rayon")]
    pub use crate::parallel::{ParallelDispatch, ParallelismConfig};
}
