//! Storage orientation and linear index arithmetic
//!
//! A matrix cell is addressed by a single `u32` key. The orientation decides
//! how `(row, column)` folds into that key and therefore which axis forms
//! contiguous key ranges. One such contiguous range is called a *lane*: a
//! whole row under `RowMajor`, a whole column under `ColumnMajor`.

use core::ops::Range;

use crate::error::{MatrixError, Result};

/// Storage orientation of a sparse matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Orientation {
    /// Keys decompose as `row * column_size + column`
    RowMajor,
    /// Keys decompose as `column * row_size + row`
    ColumnMajor,
}

/// Dimensions plus orientation, with all derived index math
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    orientation: Orientation,
    row_size: u32,
    column_size: u32,
}

impl Layout {
    /// Create a layout, rejecting shapes whose cell count exceeds the key space
    pub fn new(orientation: Orientation, row_size: u32, column_size: u32) -> Result<Self> {
        if row_size.checked_mul(column_size).is_none() {
            return Err(MatrixError::ShapeOverflow);
        }
        Ok(Self {
            orientation,
            row_size,
            column_size,
        })
    }

    /// Storage orientation
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Number of rows
    pub const fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of columns
    pub const fn column_size(&self) -> u32 {
        self.column_size
    }

    /// Total cell count, stored or not
    pub const fn total_cells(&self) -> usize {
        self.row_size as usize * self.column_size as usize
    }

    /// Whether `(row, column)` lies inside the declared dimensions
    pub const fn contains(&self, row: u32, column: u32) -> bool {
        row < self.row_size && column < self.column_size
    }

    /// Fold `(row, column)` into a linear key
    ///
    /// Callers must check `contains` first; the fold itself cannot overflow
    /// for in-bounds cells because `new` bounds the cell count.
    pub const fn key(&self, row: u32, column: u32) -> u32 {
        match self.orientation {
            Orientation::RowMajor => row * self.column_size + column,
            Orientation::ColumnMajor => column * self.row_size + row,
        }
    }

    /// Decompose a linear key back into `(row, column)`
    pub const fn cell_of(&self, key: u32) -> (u32, u32) {
        match self.orientation {
            Orientation::RowMajor => (key / self.column_size, key % self.column_size),
            Orientation::ColumnMajor => (key % self.row_size, key / self.row_size),
        }
    }

    /// Number of lanes under the active orientation
    pub const fn lane_count(&self) -> u32 {
        match self.orientation {
            Orientation::RowMajor => self.row_size,
            Orientation::ColumnMajor => self.column_size,
        }
    }

    /// Number of cells per lane
    pub const fn lane_length(&self) -> u32 {
        match self.orientation {
            Orientation::RowMajor => self.column_size,
            Orientation::ColumnMajor => self.row_size,
        }
    }

    /// Contiguous key range covering one lane
    pub const fn lane_span(&self, lane: u32) -> Range<u32> {
        let from = lane * self.lane_length();
        from..from + self.lane_length()
    }
}
