//! Row-parallel dispatch on a rayon thread pool
//!
//! For each pivot line the rows below it are split into disjoint mutable
//! slices and handed to the pool; the pivot row is shared read-only. The join
//! at the end of each parallel loop is the barrier between lines. The pool is
//! built once and reused for every line and every call.

use crate::buffer::Matrix;
use crate::dtype::Element;
use crate::error::Result;
use crate::kernels::{RowUpdate, check_system, eliminate_row};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

/// Default minimum number of rows below the pivot worth fanning out
pub const DEFAULT_MIN_ROWS: usize = 16;

/// Thread-pool configuration for row-parallel elimination
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParallelismConfig {
    /// Number of worker threads; `None` uses rayon's default (one per logical CPU)
    pub num_threads: Option<usize>,
    /// Lines with fewer remaining rows than this run on the calling thread
    pub min_rows: usize,
}

impl ParallelismConfig {
    /// Create a configuration; `None` selects the defaults
    pub fn new(num_threads: Option<usize>, min_rows: Option<usize>) -> Self {
        Self {
            num_threads,
            min_rows: min_rows.unwrap_or(DEFAULT_MIN_ROWS),
        }
    }

    /// Build the thread pool described by this configuration
    pub fn build_pool(&self) -> Result<ThreadPool> {
        let mut builder = ThreadPoolBuilder::new().thread_name(|i| format!("elimr-worker-{i}"));
        if let Some(n) = self.num_threads {
            builder = builder.num_threads(n);
        }
        Ok(builder.build()?)
    }
}

impl Default for ParallelismConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Any [`RowUpdate`] strategy run row-parallel
///
/// Produces exactly the values the wrapped strategy produces serially: each
/// row's arithmetic is unchanged and rows never read each other.
pub struct ParallelDispatch<U> {
    inner: U,
    pool: Arc<ThreadPool>,
    min_rows: usize,
}

impl<U> ParallelDispatch<U> {
    /// Wrap `inner` with a new pool built from `config`
    pub fn new(inner: U, config: ParallelismConfig) -> Result<Self> {
        let pool = Arc::new(config.build_pool()?);
        tracing::debug!(
            threads = pool.current_num_threads(),
            min_rows = config.min_rows,
            "parallel dispatch pool built"
        );
        Ok(Self::with_pool(inner, pool, config.min_rows))
    }

    /// Wrap `inner` around an existing pool
    pub fn with_pool(inner: U, pool: Arc<ThreadPool>, min_rows: usize) -> Self {
        Self {
            inner,
            pool,
            min_rows: min_rows.max(1),
        }
    }

    /// Number of worker threads in the pool
    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// The wrapped strategy
    pub fn inner(&self) -> &U {
        &self.inner
    }

    /// Reduce `matrix` and `factor` in place
    ///
    /// # Errors
    /// Same as [`forward_eliminate`](crate::kernels::forward_eliminate).
    pub fn eliminate<T>(&self, matrix: &mut Matrix<T>, factor: &mut [T]) -> Result<()>
    where
        T: Element,
        U: RowUpdate<T>,
    {
        forward_eliminate_parallel(&self.pool, self.min_rows, &self.inner, matrix, factor)
    }
}

impl<U> std::fmt::Debug for ParallelDispatch<U>
where
    U: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelDispatch")
            .field("inner", &self.inner)
            .field("threads", &self.num_threads())
            .field("min_rows", &self.min_rows)
            .finish()
    }
}

/// Row-parallel form of [`forward_eliminate`](crate::kernels::forward_eliminate)
pub(crate) fn forward_eliminate_parallel<T, U>(
    pool: &ThreadPool,
    min_rows: usize,
    update: &U,
    matrix: &mut Matrix<T>,
    factor: &mut [T],
) -> Result<()>
where
    T: Element,
    U: RowUpdate<T> + ?Sized,
{
    check_system(update, matrix, factor)?;

    let width = matrix.width();
    let stride = matrix.stride();
    let dtype = T::DTYPE;
    tracing::debug!(
        strategy = update.name(),
        %dtype,
        width,
        stride,
        threads = pool.current_num_threads(),
        "parallel forward elimination"
    );

    pool.install(|| {
        for line in 0..width.saturating_sub(1) {
            let cols = update.columns(line, width);
            let (pivot_row, rows) = matrix.split_at_pivot(line);
            let (f_head, f_rows) = factor.split_at_mut(line + 1);
            let pivot_factor = f_head[line];

            if f_rows.len() < min_rows {
                tracing::trace!(line, "pivot line (serial)");
                for (row, f) in rows.chunks_exact_mut(stride).zip(f_rows.iter_mut()) {
                    eliminate_row(update, line, &cols, pivot_row, pivot_factor, row, f);
                }
                continue;
            }

            tracing::trace!(line, rows = f_rows.len(), "pivot line");
            rows.par_chunks_exact_mut(stride)
                .zip(f_rows.par_iter_mut())
                .for_each(|(row, f)| {
                    eliminate_row(update, line, &cols, pivot_row, pivot_factor, row, f);
                });
        }
    });
    Ok(())
}
