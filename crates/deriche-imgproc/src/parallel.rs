use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how the independent lines of an axis pass are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process lines in parallel.
    #[default]
    Parallel,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Check the strategy before any work is scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`ParallelError::InvalidThreadCount`] for `Fixed(0)`.
    pub fn validate(&self) -> Result<(), ParallelError> {
        match self {
            ExecutionStrategy::Fixed(0) => Err(ParallelError::InvalidThreadCount(0)),
            _ => Ok(()),
        }
    }
}

/// Map every item through `op` under the given strategy, preserving order.
///
/// # Arguments
///
/// * `items` - The inputs, one per unit of work.
/// * `strategy` - The execution strategy.
/// * `op` - The operation applied to each item. It must not rely on the
///   order in which items are visited.
///
/// # Returns
///
/// The outputs in the same order as `items`.
pub fn map_with_strategy<I, O, F>(
    items: &[I],
    strategy: ExecutionStrategy,
    op: F,
) -> Result<Vec<O>, ParallelError>
where
    I: Sync,
    O: Send,
    F: Fn(&I) -> O + Sync + Send,
{
    strategy.validate()?;

    let out: Vec<O> = match strategy {
        ExecutionStrategy::Serial => items.iter().map(op).collect(),
        ExecutionStrategy::Parallel => items.par_iter().map(op).collect(),
        ExecutionStrategy::Fixed(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| items.par_iter().map(op).collect())
        }
    };
    Ok(out)
}
