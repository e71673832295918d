//! Fork-join climber driver
//!
//! Runs every climber to its peak with a recursive divide-and-conquer over the
//! climber slice. Ranges shorter than the cut-off are climbed sequentially on
//! the current worker; longer ranges are halved, the right half is climbed
//! inline and the left half is left for an idle worker to steal.
//!
//! Each climber and its result slot are reached through disjoint `&mut`
//! sub-slices, so results need no synchronisation: they are only read after
//! the root join returns. A panic in any climber propagates out of
//! [`HuntDriver::run`].

use crate::climber::Climber;
use crate::config::SEQUENTIAL_CUTOFF;
use crate::error::HuntError;
use crate::grid::ManaGrid;
use rayon::ThreadPoolBuilder;
use tracing::debug;

/// Parallel execution settings for a hunt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HuntDriver {
    cutoff: usize,
    workers: Option<usize>,
}

impl Default for HuntDriver {
    fn default() -> Self {
        Self {
            cutoff: SEQUENTIAL_CUTOFF,
            workers: None,
        }
    }
}

impl HuntDriver {
    /// Create a driver that runs on the global rayon pool.
    ///
    /// # Errors
    ///
    /// [`HuntError::ZeroCutoff`] if `cutoff` is zero.
    pub fn new(cutoff: usize) -> Result<Self, HuntError> {
        if cutoff == 0 {
            return Err(HuntError::ZeroCutoff);
        }
        Ok(Self {
            cutoff,
            workers: None,
        })
    }

    /// Run on a dedicated pool of `workers` threads instead of the global pool.
    ///
    /// # Errors
    ///
    /// [`HuntError::ZeroWorkers`] if `workers` is zero.
    pub fn with_workers(mut self, workers: usize) -> Result<Self, HuntError> {
        if workers == 0 {
            return Err(HuntError::ZeroWorkers);
        }
        self.workers = Some(workers);
        Ok(self)
    }

    #[must_use]
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    #[must_use]
    pub fn workers(&self) -> Option<usize> {
        self.workers
    }

    /// Climb every climber and write `results[i] = climbers[i].find_peak(grid)`.
    ///
    /// # Errors
    ///
    /// [`HuntError::ThreadPool`] if the dedicated worker pool cannot be built.
    ///
    /// # Panics
    ///
    /// Panics if `climbers` and `results` differ in length, or if any climber
    /// panics.
    pub fn run(
        &self,
        climbers: &mut [Climber],
        grid: &ManaGrid,
        results: &mut [i32],
    ) -> Result<(), HuntError> {
        assert_eq!(
            climbers.len(),
            results.len(),
            "One result slot is required per climber"
        );

        match self.workers {
            Some(workers) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|index| format!("hunt-worker-{index}"))
                    .build()?;
                debug!(
                    "Hunting with {} climbers on a dedicated {}-thread pool (cut-off {})",
                    climbers.len(),
                    workers,
                    self.cutoff
                );
                pool.install(|| search_range(climbers, grid, results, self.cutoff));
            }
            None => {
                debug!(
                    "Hunting with {} climbers on the global pool ({} threads, cut-off {})",
                    climbers.len(),
                    rayon::current_num_threads(),
                    self.cutoff
                );
                search_range(climbers, grid, results, self.cutoff);
            }
        }
        Ok(())
    }

    /// Convenience wrapper around [`Self::run`] that allocates the results.
    ///
    /// # Errors
    ///
    /// See [`Self::run`].
    pub fn hunt(&self, climbers: &mut [Climber], grid: &ManaGrid) -> Result<Vec<i32>, HuntError> {
        let mut results = vec![0; climbers.len()];
        self.run(climbers, grid, &mut results)?;
        Ok(results)
    }
}

fn search_range(climbers: &mut [Climber], grid: &ManaGrid, results: &mut [i32], cutoff: usize) {
    // A single climber cannot be split further, whatever the cut-off
    if climbers.len() < cutoff || climbers.len() == 1 {
        for (climber, result) in climbers.iter_mut().zip(results.iter_mut()) {
            *result = climber.find_peak(grid);
        }
        return;
    }

    let mid = climbers.len() / 2;
    let (left, right) = climbers.split_at_mut(mid);
    let (left_results, right_results) = results.split_at_mut(mid);

    // rayon::join runs the first closure inline and offers the second for stealing
    rayon::join(
        || search_range(right, grid, right_results, cutoff),
        || search_range(left, grid, left_results, cutoff),
    );
}
