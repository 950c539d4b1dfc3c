//! Serial/parallel execution strategy
//!
//! Bulk operations pick their strategy per call. Serial passes walk the
//! store in key order on the calling thread. Parallel passes split the work
//! into independent units (one per lane, or one per driving-vector entry),
//! run the units on the rayon pool, and use the pool's join as the
//! completion barrier: every unit finishes exactly once before the call
//! resumes, and all unit results are visible to the calling thread.
//!
//! Units only *read* the shared store; they return the updates for their
//! partition and the calling thread applies them afterwards. Keeping all
//! writes on the calling thread is what lets removals and monitor
//! notifications stay single-writer. A panicking unit propagates through
//! the join to the caller; nothing is retried.

use rayon::prelude::*;

/// Execution strategy for bulk matrix operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecMode {
    /// Single-threaded traversal in key order
    #[default]
    Serial,
    /// Partitioned execution on the rayon pool
    Parallel,
}

/// Run one unit per lane index and collect the results in lane order
pub(crate) fn compute_by_lane<T, F>(lanes: u32, unit: F) -> Vec<T>
where
    T: Send,
    F: Fn(u32) -> T + Send + Sync,
{
    log::debug!("dispatching {lanes} lane units");
    (0..lanes).into_par_iter().map(unit).collect()
}

/// Run one unit per driving entry and collect the results in entry order
pub(crate) fn compute_by_entry<T, F>(entries: &[(u32, f32)], unit: F) -> Vec<T>
where
    T: Send,
    F: Fn(u32, f32) -> T + Send + Sync,
{
    log::debug!("dispatching {} entry units", entries.len());
    entries
        .par_iter()
        .map(|&(index, value)| unit(index, value))
        .collect()
}
