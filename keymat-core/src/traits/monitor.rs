//! Change-notification contract for dependent structures
//!
//! Monitors are told whenever a matrix's stored entry count transitions,
//! e.g. when a cell is removed or the whole store is cleared. Notification
//! is synchronous: it completes before the mutating call returns.

use super::matrix::SparseAccess;

/// One entry-count transition, old and new counts side by side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    /// Stored entry count before the mutation
    pub old_element_size: usize,
    /// Stored entry count after the mutation
    pub new_element_size: usize,
    /// Known cell count before the mutation
    pub old_known_size: usize,
    /// Known cell count after the mutation
    pub new_known_size: usize,
    /// Unknown cell count before the mutation
    pub old_unknown_size: usize,
    /// Unknown cell count after the mutation
    pub new_unknown_size: usize,
}

impl SizeChange {
    /// Build the transition from `old_elements` to `new_elements` stored
    /// entries in a matrix of `total_cells` cells
    pub const fn between(total_cells: usize, old_elements: usize, new_elements: usize) -> Self {
        Self {
            old_element_size: old_elements,
            new_element_size: new_elements,
            old_known_size: old_elements,
            new_known_size: new_elements,
            old_unknown_size: total_cells - old_elements,
            new_unknown_size: total_cells - new_elements,
        }
    }
}

/// Listener for entry-count transitions
///
/// Implementations must tolerate being detached at any time and must not
/// assume they are the only attached monitor.
pub trait SizeMonitor: Send + Sync {
    /// Called once per transition, after the store has been mutated
    fn notify_size_changed(&self, matrix: &dyn SparseAccess, change: SizeChange);
}
