//! Key-space and flattened-array validation
//!
//! Pure checks with no I/O: everything here is index arithmetic over the
//! declared dimensions or over flattened key/value arrays.

use crate::error::{MatrixError, Result};
use crate::format::Layout;

/// Validate that `(row, column)` addresses a cell of `layout`
pub const fn check_cell(layout: &Layout, row: u32, column: u32) -> Result<()> {
    if layout.contains(row, column) {
        Ok(())
    } else {
        Err(MatrixError::CellOutOfBounds)
    }
}

/// Validate that a linear key lies inside `[0, limit)`
pub const fn check_key(key: u32, limit: usize) -> Result<()> {
    if (key as usize) < limit {
        Ok(())
    } else {
        Err(MatrixError::KeyOutOfBounds)
    }
}

/// Validate a flattened key/value pair of arrays against a key limit
///
/// Keys must be strictly ascending (which also rules out duplicates) and
/// every key must lie inside `[0, limit)`. Values are only checked for
/// alignment with the keys.
pub fn check_flat(keys: &[u32], values: &[f32], limit: usize) -> Result<()> {
    if keys.len() != values.len() {
        return Err(MatrixError::MisalignedArrays);
    }
    let mut previous: Option<u32> = None;
    for &key in keys {
        check_key(key, limit)?;
        if let Some(previous) = previous {
            if key <= previous {
                return Err(MatrixError::UnsortedKeys);
            }
        }
        previous = Some(key);
    }
    Ok(())
}
