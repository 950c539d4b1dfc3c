//! keymat - Sparse Matrix Algebra with Orientation-Aware Storage
//!
//! This library provides a sparse matrix keyed by linearized cell addresses,
//! with row- or column-major orientation fixed at construction time.
//!
//! ## Architecture
//!
//! keymat follows a clean definition/implementation separation:
//!
//! - **keymat-core**: Pure definitions - orientation arithmetic, persistence
//!   tags, the merge-join, traits, and validation (no storage, no I/O)
//! - **keymat**: Concrete storage backends, matrix algebra, execution
//!   strategies, and persistence
//!
//! ## Quick Start
//!
//! ```rust
//! use keymat::{KeyMatrix, Orientation, Result};
//!
//! fn example() -> Result<()> {
//!     let mut matrix = KeyMatrix::new(Orientation::RowMajor, 100, 50)?;
//!
//!     matrix.set_value(3, 7, 0.5)?;
//!     let row = matrix.row_vector(3)?;
//!     assert_eq!(row.try_get(7), Some(0.5));
//!
//!     matrix.scale_all(2.0);
//!     assert_eq!(matrix.get_value(3, 7)?, 1.0);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Ordered sparse storage**: B-tree or paired-array backends behind one
//!   enum, both iterating in ascending key order
//! - **Lane views**: Zero-copy row/column windows over the store
//! - **Merge-join algebra**: Element-wise and product operations intersect
//!   operands in O(m + n)
//! - **Per-call parallelism**: Bulk operations choose serial or rayon-backed
//!   execution at each call site
//! - **Size monitors**: Weakly-held observers notified on every element
//!   count change

// Re-export core definitions
pub use keymat_core::{
    // Traits
    SizeChange, SizeMonitor, SparseAccess,
    // Format definitions
    Layout, Orientation, StoreTag,
    // Error handling
    ErrorCategory, MatrixError, Result,
    // Algorithms and validation
    merge, validation,
};

// Implementation modules
pub mod attribute;
pub mod exec;
pub mod matrix;
pub mod monitor;
pub mod store;
pub mod vector;

// Public exports
pub use attribute::RangeAttribute;
pub use exec::ExecMode;
pub use matrix::{Cell, CellUpdate, KeyMatrix};
pub use monitor::MonitorRegistry;
pub use store::{FlatStore, SparseStore};
pub use vector::{SparseVector, VectorView};
