//! Abstract read access to an orientation-flexible sparse matrix
//!
//! This is the interface monitors and other collaborators see; concrete
//! storage lives in the implementation crate.

use crate::format::Orientation;

/// Read-only view of a sparse matrix with known/unknown bookkeeping
pub trait SparseAccess {
    /// Number of rows
    fn row_size(&self) -> u32;

    /// Number of columns
    fn column_size(&self) -> u32;

    /// Storage orientation
    fn orientation(&self) -> Orientation;

    /// Number of stored entries
    fn element_size(&self) -> usize;

    /// Number of known cells (identical to the stored entry count)
    fn known_size(&self) -> usize {
        self.element_size()
    }

    /// Number of cells without a stored value
    fn unknown_size(&self) -> usize {
        self.row_size() as usize * self.column_size() as usize - self.element_size()
    }

    /// Value at `(row, column)`
    ///
    /// `None` when the cell is not stored or the position is out of bounds.
    fn try_get(&self, row: u32, column: u32) -> Option<f32>;
}
