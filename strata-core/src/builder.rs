//! Builder utilities for configuring Strata runs.
//!
//! Exposes the execution strategy selection surface and the validation
//! performed before a [`Strata`] instance is constructed.

use std::num::NonZeroUsize;

use crate::{Result, error::StrataError, strata::Strata};

/// Indicates whether [`Strata`] spreads data-parallel stages over rayon.
///
/// `Auto` uses rayon when the `parallel` feature is compiled in and runs
/// sequentially otherwise, so results stay identical across builds.
///
/// # Examples
/// ```
/// use strata_core::ExecutionStrategy;
///
/// let strategy = ExecutionStrategy::default();
/// assert_eq!(strategy, ExecutionStrategy::Auto);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Let the library pick based on the compiled features.
    #[default]
    Auto,
    /// Run every stage on the calling thread.
    Sequential,
    /// Require the rayon backend.
    Parallel,
}

impl ExecutionStrategy {
    /// Resolves the strategy to "use rayon or not" for the current build.
    ///
    /// # Errors
    /// Returns [`StrataError::BackendUnavailable`] for
    /// [`ExecutionStrategy::Parallel`] when the `parallel` feature is off.
    pub fn resolve(self) -> Result<bool> {
        match self {
            Self::Auto => Ok(cfg!(feature = "parallel")),
            Self::Sequential => Ok(false),
            #[cfg(feature = "parallel")]
            Self::Parallel => Ok(true),
            #[cfg(not(feature = "parallel"))]
            Self::Parallel => Err(StrataError::BackendUnavailable {
                requested: Self::Parallel,
            }),
        }
    }
}

/// Configures and constructs [`Strata`] instances.
///
/// # Examples
/// ```
/// use strata_core::{ExecutionStrategy, StrataBuilder};
///
/// let strata = StrataBuilder::new()
///     .with_min_cluster_size(8)
///     .with_min_samples(3)
///     .with_execution_strategy(ExecutionStrategy::Sequential)
///     .build()?;
/// assert_eq!(strata.min_cluster_size().get(), 8);
/// assert_eq!(strata.min_samples().get(), 3);
/// assert_eq!(strata.execution_strategy(), ExecutionStrategy::Sequential);
/// # Ok::<(), strata_core::StrataError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StrataBuilder {
    min_cluster_size: usize,
    min_samples: Option<usize>,
    execution_strategy: ExecutionStrategy,
}

impl Default for StrataBuilder {
    fn default() -> Self {
        Self {
            min_cluster_size: 5,
            min_samples: None,
            execution_strategy: ExecutionStrategy::Auto,
        }
    }
}

impl StrataBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use strata_core::{ExecutionStrategy, StrataBuilder};
    ///
    /// let builder = StrataBuilder::new();
    /// assert_eq!(builder.min_cluster_size(), 5);
    /// assert_eq!(builder.min_samples(), None);
    /// assert_eq!(builder.execution_strategy(), ExecutionStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the minimum cluster size.
    #[must_use]
    pub fn with_min_cluster_size(mut self, size: usize) -> Self {
        self.min_cluster_size = size;
        self
    }

    /// Returns the configured minimum cluster size.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_cluster_size(&self) -> usize { self.min_cluster_size }

    /// Overrides the neighbour rank used for core distances.
    ///
    /// When unset, `min_samples` follows `min_cluster_size`.
    #[must_use]
    pub fn with_min_samples(mut self, min_samples: usize) -> Self {
        self.min_samples = Some(min_samples);
        self
    }

    /// Returns the explicitly configured `min_samples`, if any.
    #[must_use]
    #[rustfmt::skip]
    pub fn min_samples(&self) -> Option<usize> { self.min_samples }

    /// Sets the execution strategy to use when running the algorithm.
    #[must_use]
    pub fn with_execution_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.execution_strategy = strategy;
        self
    }

    /// Returns the currently configured execution strategy.
    #[must_use]
    #[rustfmt::skip]
    pub fn execution_strategy(&self) -> ExecutionStrategy { self.execution_strategy }

    /// Validates the configuration and constructs a [`Strata`] instance.
    ///
    /// # Errors
    /// Returns [`StrataError::InvalidMinClusterSize`] when
    /// `min_cluster_size < 2` and [`StrataError::InvalidMinSamples`] when
    /// `min_samples` is zero.
    ///
    /// # Examples
    /// ```
    /// use strata_core::{StrataBuilder, StrataError};
    ///
    /// let err = StrataBuilder::new().with_min_cluster_size(1).build().unwrap_err();
    /// assert_eq!(err, StrataError::InvalidMinClusterSize { got: 1 });
    /// ```
    pub fn build(self) -> Result<Strata> {
        let min_cluster_size = NonZeroUsize::new(self.min_cluster_size)
            .filter(|size| size.get() >= 2)
            .ok_or(StrataError::InvalidMinClusterSize {
                got: self.min_cluster_size,
            })?;
        let min_samples = match self.min_samples {
            None => min_cluster_size,
            Some(got) => NonZeroUsize::new(got).ok_or(StrataError::InvalidMinSamples { got })?,
        };

        Ok(Strata::new(
            min_cluster_size,
            min_samples,
            self.execution_strategy,
        ))
    }
}
