//! Strategy selection, made once at startup
//!
//! ```ignore
//! use elimr::prelude::*;
//!
//! let eliminator = Eliminator::new(
//!     EliminationConfig::default()
//!         .with_strategy(Strategy::UnrolledVector)
//!         .with_parallelism(ParallelismConfig::new(Some(4), None)),
//! )?;
//! eliminator.eliminate(&mut matrix, &mut factor)?;
//! ```

use crate::buffer::Matrix;
use crate::dtype::{DType, Element};
use crate::error::{Error, Result};
use crate::kernels::{
    Intrinsic, RowUpdate, Scalar, Unrolled, UnrolledIntrinsic, UnrolledVector, Vector, Zipped,
    forward_eliminate,
};
use crate::simd::{SimdLevel, detect_simd};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "rayon")]
use crate::parallel::{ParallelismConfig, forward_eliminate_parallel};
#[cfg(feature = "rayon")]
use std::sync::Arc;

/// Lane widths a vector strategy can be instantiated with
pub const SUPPORTED_LANES: [usize; 5] = [1, 2, 4, 8, 16];

/// Row-update strategy to run
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Resolved per element type from the detected SIMD level
    #[default]
    Auto,
    /// Indexed reference loop
    Scalar,
    /// Iterator walk, vectorized by the compiler
    Zipped,
    /// Four columns per iteration
    Unrolled,
    /// Portable lanes with fused multiply-add
    Vector,
    /// Portable lanes, four per iteration
    UnrolledVector,
    /// SSE/NEON, four f32 columns per step
    Intrinsic,
    /// SSE/NEON, sixteen f32 columns per iteration
    UnrolledIntrinsic,
}

impl Strategy {
    /// Every concrete (non-`Auto`) strategy
    pub const ALL: [Strategy; 7] = [
        Strategy::Scalar,
        Strategy::Zipped,
        Strategy::Unrolled,
        Strategy::Vector,
        Strategy::UnrolledVector,
        Strategy::Intrinsic,
        Strategy::UnrolledIntrinsic,
    ];

    /// Kebab-case name
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Scalar => "scalar",
            Self::Zipped => "zipped",
            Self::Unrolled => "unrolled",
            Self::Vector => "vector",
            Self::UnrolledVector => "unrolled-vector",
            Self::Intrinsic => "intrinsic",
            Self::UnrolledIntrinsic => "unrolled-intrinsic",
        }
    }

    /// Returns true for the strategies that sweep whole lanes
    pub const fn is_lane_wide(self) -> bool {
        matches!(
            self,
            Self::Vector | Self::UnrolledVector | Self::Intrinsic | Self::UnrolledIntrinsic
        )
    }

    /// Returns true if the strategy produces the scalar reference bits
    pub const fn is_bit_exact(self) -> bool {
        matches!(self, Self::Scalar | Self::Zipped | Self::Unrolled)
    }

    /// Returns true if the strategy runs on `dtype`
    pub const fn supports(self, dtype: DType) -> bool {
        match self {
            Self::Intrinsic | Self::UnrolledIntrinsic => matches!(dtype, DType::F32),
            _ => true,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        std::iter::once(Strategy::Auto)
            .chain(Strategy::ALL)
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_argument("strategy", format!("unknown strategy '{s}'")))
    }
}

/// Builder-style elimination settings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EliminationConfig {
    /// Strategy to run
    pub strategy: Strategy,
    /// Lane width for the vector strategies; `None` uses the detected register width
    pub lanes: Option<usize>,
    /// Row-parallel dispatch; `None` runs on the calling thread
    #[cfg(feature = "rayon")]
    pub parallelism: Option<ParallelismConfig>,
}

impl EliminationConfig {
    /// Select the strategy
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Pin the lane width of the vector strategies
    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = Some(lanes);
        self
    }

    /// Run rows of each pivot line on a thread pool
    #[cfg(feature = "rayon")]
    pub fn with_parallelism(mut self, parallelism: ParallelismConfig) -> Self {
        self.parallelism = Some(parallelism);
        self
    }
}

/// A resolved [`EliminationConfig`]
///
/// Owns the thread pool when parallel dispatch is enabled, so the pool is
/// built once and reused by every call.
pub struct Eliminator {
    strategy: Strategy,
    lanes: Option<usize>,
    level: SimdLevel,
    #[cfg(feature = "rayon")]
    pool: Option<(Arc<rayon::ThreadPool>, usize)>,
}

impl Eliminator {
    /// Resolve `config` against the running CPU
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for a lane width outside [`SUPPORTED_LANES`]
    /// - [`Error::BackendLimitation`] for an intrinsic strategy on a CPU without one
    /// - [`Error::ThreadPool`] if the worker pool cannot be started
    pub fn new(config: EliminationConfig) -> Result<Self> {
        if let Some(lanes) = config.lanes
            && !SUPPORTED_LANES.contains(&lanes)
        {
            return Err(Error::invalid_argument(
                "lanes",
                format!("{lanes} is not one of {SUPPORTED_LANES:?}"),
            ));
        }
        if matches!(
            config.strategy,
            Strategy::Intrinsic | Strategy::UnrolledIntrinsic
        ) {
            Intrinsic::new()?;
        }

        let level = detect_simd();

        #[cfg(feature = "rayon")]
        let pool = match config.parallelism {
            Some(parallelism) => Some((Arc::new(parallelism.build_pool()?), parallelism.min_rows)),
            None => None,
        };

        let eliminator = Self {
            strategy: config.strategy,
            lanes: config.lanes,
            level,
            #[cfg(feature = "rayon")]
            pool,
        };
        tracing::debug!(
            strategy = %eliminator.strategy,
            lanes = ?eliminator.lanes,
            simd_level = %level,
            threads = eliminator.num_threads(),
            "eliminator configured"
        );
        Ok(eliminator)
    }

    /// Configured strategy (possibly `Auto`)
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// SIMD level detected at construction
    pub fn level(&self) -> SimdLevel {
        self.level
    }

    /// Worker threads used per pivot line (1 when serial)
    pub fn num_threads(&self) -> usize {
        #[cfg(feature = "rayon")]
        if let Some((pool, _)) = &self.pool {
            return pool.current_num_threads();
        }
        1
    }

    /// Strategy and lane width that run for `dtype`
    pub fn resolve(&self, dtype: DType) -> (Strategy, usize) {
        let lanes = self.lanes.unwrap_or_else(|| self.level.lanes(dtype).max(1));
        let strategy = match self.strategy {
            Strategy::Auto
                if self.lanes.is_none()
                    && dtype == DType::F32
                    && self.level.has_f32x4()
                    && cfg!(any(target_arch = "x86_64", target_arch = "aarch64")) =>
            {
                Strategy::UnrolledIntrinsic
            }
            Strategy::Auto => Strategy::UnrolledVector,
            other => other,
        };
        match strategy {
            Strategy::Intrinsic | Strategy::UnrolledIntrinsic => (strategy, 4),
            Strategy::Scalar | Strategy::Zipped | Strategy::Unrolled => (strategy, 1),
            _ => (strategy, lanes),
        }
    }

    /// Reduce `matrix` and `factor` in place with the configured strategy
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if `factor.len() != matrix.width()`
    /// - [`Error::UnsupportedDType`] for an intrinsic strategy on f64
    /// - [`Error::InvalidArgument`] if the lane width does not fit the element type
    pub fn eliminate<T: Element>(&self, matrix: &mut Matrix<T>, factor: &mut [T]) -> Result<()> {
        let (strategy, lanes) = self.resolve(T::DTYPE);
        match strategy {
            Strategy::Scalar => self.run(&Scalar, matrix, factor),
            Strategy::Zipped => self.run(&Zipped, matrix, factor),
            Strategy::Unrolled => self.run(&Unrolled, matrix, factor),
            Strategy::Vector => match lanes {
                1 => self.run(&Vector::<1>, matrix, factor),
                2 => self.run(&Vector::<2>, matrix, factor),
                4 => self.run(&Vector::<4>, matrix, factor),
                8 => self.run(&Vector::<8>, matrix, factor),
                _ => self.run(&Vector::<16>, matrix, factor),
            },
            Strategy::UnrolledVector | Strategy::Auto => match lanes {
                1 => self.run(&UnrolledVector::<1>, matrix, factor),
                2 => self.run(&UnrolledVector::<2>, matrix, factor),
                4 => self.run(&UnrolledVector::<4>, matrix, factor),
                8 => self.run(&UnrolledVector::<8>, matrix, factor),
                _ => self.run(&UnrolledVector::<16>, matrix, factor),
            },
            Strategy::Intrinsic => self.run(&Intrinsic::new()?, matrix, factor),
            Strategy::UnrolledIntrinsic => self.run(&UnrolledIntrinsic::new()?, matrix, factor),
        }
    }

    fn run<T: Element, U: RowUpdate<T>>(
        &self,
        update: &U,
        matrix: &mut Matrix<T>,
        factor: &mut [T],
    ) -> Result<()> {
        #[cfg(feature = "rayon")]
        if let Some((pool, min_rows)) = &self.pool {
            return forward_eliminate_parallel(pool, *min_rows, update, matrix, factor);
        }
        forward_eliminate(update, matrix, factor)
    }
}

impl fmt::Debug for Eliminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Eliminator")
            .field("strategy", &self.strategy)
            .field("lanes", &self.lanes)
            .field("level", &self.level)
            .field("threads", &self.num_threads())
            .finish()
    }
}
