//! Parallelizer contract
//!
//! The engine produces [`Splittable`] units; a [`Parallelizer`] decides
//! where they run. Execution is synchronous: [`Parallelizer::execute`]
//! returns only after every unit, including recursively split children,
//! has completed.

use crate::error::{ScaleError, ScaleResult};
use log::trace;

/// A unit of work that can bisect itself
pub trait Splittable: Send + Sized {
    type Error: Send;

    /// Whether this unit is large enough to be split again.
    fn worth_to_split(&self) -> bool;

    /// Split into two disjoint halves.
    fn split(self) -> (Self, Self);

    /// Do the work.
    fn run(self) -> Result<(), Self::Error>;
}

/// Executes splittable units
pub trait Parallelizer: Send + Sync {
    /// Number of workers units may run on.
    fn parallelism(&self) -> usize;

    /// Split `unit` as far as it wants and run every piece.
    ///
    /// Returns the number of units that ran.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by a unit. Other units still run
    /// to completion.
    fn execute<S: Splittable>(&self, unit: S) -> Result<usize, S::Error>;
}

/// Runs units on a rayon pool
///
/// Without a dedicated pool, work goes to rayon's global pool.
#[derive(Debug, Default)]
pub struct RayonParallelizer {
    pool: Option<rayon::ThreadPool>,
}

impl RayonParallelizer {
    /// Use rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dedicated pool with `threads` workers.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::ThreadPool`] if the pool cannot be built.
    pub fn with_threads(threads: usize) -> ScaleResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("blitkit-scale-{i}"))
            .build()
            .map_err(|e| ScaleError::ThreadPool(e.to_string()))?;
        Ok(Self { pool: Some(pool) })
    }
}

impl Parallelizer for RayonParallelizer {
    fn parallelism(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn execute<S: Splittable>(&self, unit: S) -> Result<usize, S::Error> {
        match &self.pool {
            Some(pool) => pool.install(|| split_and_join(unit)),
            None => split_and_join(unit),
        }
    }
}

fn split_and_join<S: Splittable>(unit: S) -> Result<usize, S::Error> {
    if !unit.worth_to_split() {
        unit.run()?;
        return Ok(1);
    }
    let (left, right) = unit.split();
    let (left, right) = rayon::join(|| split_and_join(left), || split_and_join(right));
    Ok(left? + right?)
}

/// Runs every unit on the calling thread
///
/// Units are still split, so results match a parallel run.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequentialParallelizer;

impl Parallelizer for SequentialParallelizer {
    fn parallelism(&self) -> usize {
        1
    }

    fn execute<S: Splittable>(&self, unit: S) -> Result<usize, S::Error> {
        let mut pending = vec![unit];
        let mut ran = 0;
        let mut first_error = None;
        while let Some(unit) = pending.pop() {
            if unit.worth_to_split() {
                let (left, right) = unit.split();
                pending.push(right);
                pending.push(left);
                continue;
            }
            ran += 1;
            if let Err(e) = unit.run()
                && first_error.is_none()
            {
                first_error = Some(e);
            }
        }
        trace!("sequential parallelizer ran {ran} units");
        match first_error {
            Some(e) => Err(e),
            None => Ok(ran),
        }
    }
}
