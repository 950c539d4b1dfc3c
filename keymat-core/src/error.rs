//! Error types for keymat operations

/// Broad failure classes, matching how callers are expected to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Shape and capacity violations: wrong accessor, out-of-range cell.
    Shape,
    /// Lookups of cells that are not stored.
    Access,
    /// Flatten/rehydrate failures.
    Persistence,
}

/// Errors that can occur during keymat operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixError {
    /// The accessor does not match the matrix orientation
    OrientationMismatch,
    /// Row or column index outside the declared dimensions
    CellOutOfBounds,
    /// Linear key outside `[0, row_size * column_size)`
    KeyOutOfBounds,
    /// `row_size * column_size` does not fit the key space
    ShapeOverflow,
    /// Operand dimensions do not line up with this matrix
    DimensionMismatch,
    /// The addressed cell is not stored
    MissingCell,
    /// Rehydration tag does not name a known store backend
    UnknownStoreTag,
    /// Flattened key and value arrays differ in length
    MisalignedArrays,
    /// Flattened keys are not strictly ascending
    UnsortedKeys,
}

impl MatrixError {
    /// Category of this error
    pub const fn category(self) -> ErrorCategory {
        match self {
            MatrixError::OrientationMismatch
            | MatrixError::CellOutOfBounds
            | MatrixError::KeyOutOfBounds
            | MatrixError::ShapeOverflow
            | MatrixError::DimensionMismatch => ErrorCategory::Shape,
            MatrixError::MissingCell => ErrorCategory::Access,
            MatrixError::UnknownStoreTag
            | MatrixError::MisalignedArrays
            | MatrixError::UnsortedKeys => ErrorCategory::Persistence,
        }
    }
}

impl core::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            MatrixError::OrientationMismatch => "Accessor does not match matrix orientation",
            MatrixError::CellOutOfBounds => "Cell index out of bounds",
            MatrixError::KeyOutOfBounds => "Linear key out of bounds",
            MatrixError::ShapeOverflow => "Matrix shape exceeds the key space",
            MatrixError::DimensionMismatch => "Operand dimensions do not line up",
            MatrixError::MissingCell => "Cell is not stored",
            MatrixError::UnknownStoreTag => "Unknown sparse store tag",
            MatrixError::MisalignedArrays => "Key and value arrays differ in length",
            MatrixError::UnsortedKeys => "Keys are not strictly ascending",
        };
        write!(f, "{msg}")
    }
}

/// Result type for keymat operations
pub type Result<T> = core::result::Result<T, MatrixError>;
