//! Validation utilities for keymat
//!
//! Pure validation functions with no I/O dependencies.

pub mod bounds;

pub use bounds::{check_cell, check_flat, check_key};
