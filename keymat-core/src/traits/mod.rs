//! Abstract interfaces for the keymat ecosystem
//!
//! Traits are pure interfaces - no concrete implementations.

pub mod matrix;
pub mod monitor;

pub use matrix::SparseAccess;
pub use monitor::{SizeChange, SizeMonitor};
