//! Cache-blocked dense matrices in Rust.
//!
//! A [`BlockMatrix`] stores its elements as a grid of small square tiles,
//! each one contiguous in memory. Walking a row, a column or a sub-matrix,
//! transposing and multiplying then only touch a handful of tiles at a time,
//! which keep resident in L1 instead of striding across whole rows.
//!
//! ## Usage
//!
//! ```
//! use blockmat::RealBlockMatrix;
//!
//! let a = RealBlockMatrix::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
//! let b = RealBlockMatrix::from_rows(&[[5.0, 6.0], [7.0, 8.0]]).unwrap();
//!
//! let c = a.multiply(&b).unwrap();
//! assert_eq!(c.block_size(), 52);
//! assert_eq!(c.to_rows(), vec![vec![19.0, 22.0], vec![43.0, 50.0]]);
//! assert_eq!(c.transpose().get_entry(0, 1).unwrap(), 43.0);
//! ```
//!
//! The code is generic over [`FieldElement`]; `f64` is the fast path and
//! [`ModInt`] gives exact arithmetic over a prime field:
//!
//! ```
//! use blockmat::{BlockMatrix, ModInt};
//!
//! type F = ModInt<7>;
//! let m = BlockMatrix::from_rows(&[[F::new(3), F::new(5)], [F::new(1), F::new(6)]]).unwrap();
//! let squared = m.multiply(&m).unwrap();
//! assert_eq!(squared.get_entry(0, 0).unwrap(), F::new(0)); // 9 + 5 = 14 = 0 mod 7
//! ```
//!
//! ## What's inside
//!
//! - Block-index arithmetic and raw ⇄ tiled conversion
//! - Tiled multiply with a 4-way unrolled kernel, plus matrix×vector
//! - Row, column and sub-matrix copies across tile boundaries
//! - Tile-wise transpose
//! - Visitor traversal in row, column or tile order

pub mod blocked;
pub mod error;
pub mod field;
pub mod kernels;
pub mod matrix;

pub use blocked::BlockMatrix;
pub use blocked::layout::BlockLayout;
pub use blocked::walk::{ChangingVisitor, PreservingVisitor};
pub use error::{Axis, MatrixError, Result};
pub use field::{FieldElement, ModInt};
pub use matrix::{DenseMatrix, MatrixAccess};

/// `f64` matrix with the tuned real block size.
pub type RealBlockMatrix = BlockMatrix<f64>;
