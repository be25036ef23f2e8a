//! Plain row-major matrices and naive baselines.
//!
//! [`DenseMatrix`] is the simplest thing that implements [`MatrixAccess`]:
//! the blocked kernels accept it through their generic slow path, and the
//! naive loops here are the correctness baselines the blocked algorithms
//! are tested against.

pub mod dense;
pub mod naive_ijk;
pub mod naive_ikj;
pub mod transpose;

use crate::blocked::BlockMatrix;

pub use dense::DenseMatrix;

/// Read access to any matrix, whatever its storage.
///
/// Blocked operations accept `&impl MatrixAccess<T>` as their second
/// operand. When [`as_blocked`](MatrixAccess::as_blocked) reports a blocked
/// layout with a matching block size, they walk both operands tile by tile;
/// otherwise they fall back to per-element [`entry`](MatrixAccess::entry)
/// calls.
pub trait MatrixAccess<T> {
    fn rows(&self) -> usize;

    fn columns(&self) -> usize;

    /// Element at (`row`, `column`). Indices are not range checked.
    fn entry(&self, row: usize, column: usize) -> T;

    /// The blocked storage behind this matrix, if there is one.
    fn as_blocked(&self) -> Option<&BlockMatrix<T>> {
        None
    }
}
