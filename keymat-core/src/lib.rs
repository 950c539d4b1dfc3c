#![no_std]

//! keymat core - sparse matrix algebra definitions
//!
//! This crate provides the pure definitions shared by keymat
//! implementations: the error taxonomy, orientation and index arithmetic,
//! persistence tags, the merge-join algorithm, and the abstract matrix and
//! monitor traits. No storage and no I/O live here.

pub mod error;
pub mod format;
pub mod merge;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::*;
