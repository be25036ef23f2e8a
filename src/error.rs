//! Error types for matrix operations.

use std::fmt;

use thiserror::Error;

/// Which matrix axis an index or range refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Column => f.write_str("column"),
        }
    }
}

/// Error type for matrix construction and operations.
///
/// Every variant is raised at the boundary of the public operation that
/// first sees the bad input, before any element is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// A matrix needs at least one row and one column.
    #[error("matrix dimensions must be positive, got {rows}x{columns}")]
    NotStrictlyPositive { rows: usize, columns: usize },

    /// Tiles need at least one element per side.
    #[error("block size must be positive, got {0}")]
    InvalidBlockSize(usize),

    /// A flat length (vector, row, tile buffer) is wrong.
    #[error("{what}: expected length {expected}, got {actual}")]
    DimensionMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    /// Two matrix shapes disagree.
    #[error(
        "matrix dimension mismatch: expected {expected_rows}x{expected_columns}, got {actual_rows}x{actual_columns}"
    )]
    MatrixDimensionMismatch {
        expected_rows: usize,
        expected_columns: usize,
        actual_rows: usize,
        actual_columns: usize,
    },

    /// An index lies outside `[0, bound)`.
    #[error("{axis} index {index} out of range [0, {bound})")]
    OutOfRange {
        axis: Axis,
        index: usize,
        bound: usize,
    },

    /// An inclusive range ends before it starts.
    #[error("{axis} range ends at {end} before its start {start}")]
    InvalidRange {
        axis: Axis,
        start: usize,
        end: usize,
    },

    /// Supplied data has no rows or no columns.
    #[error("no data: {0}")]
    NoData(&'static str),

    /// Operation requires a square matrix.
    #[error("matrix must be square, got {rows}x{columns}")]
    NotSquare { rows: usize, columns: usize },
}

impl MatrixError {
    pub(crate) fn shape(
        expected_rows: usize,
        expected_columns: usize,
        actual_rows: usize,
        actual_columns: usize,
    ) -> Self {
        MatrixError::MatrixDimensionMismatch {
            expected_rows,
            expected_columns,
            actual_rows,
            actual_columns,
        }
    }

    pub(crate) fn length(what: impl Into<String>, expected: usize, actual: usize) -> Self {
        MatrixError::DimensionMismatch {
            what: what.into(),
            expected,
            actual,
        }
    }
}

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
