//! Element algebra consumed by the blocked kernels.
//!
//! Everything in this crate is written once against [`FieldElement`]. The
//! native floats are the numeric-kernel instantiation; [`ModInt`] is an
//! exact abstract-algebra instantiation of the same code.

pub mod modular;

use std::fmt::Debug;
use std::ops::{Add, Mul, Sub};

use num_traits::{One, Zero};

pub use modular::ModInt;

/// Nominal tile side for types without a tuned value.
pub const DEFAULT_BLOCK_SIZE: usize = 36;

/// Tile side for 8-byte floats: three 52×52 tiles of f64 take ~64 KB.
pub const REAL_BLOCK_SIZE: usize = 52;

/// The capability set a matrix element must provide: a zero, a one, and
/// closed add/subtract/multiply.
pub trait FieldElement:
    Copy
    + Debug
    + PartialEq
    + Zero
    + One
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Default tile side for matrices of this element type.
    ///
    /// Three tiles (two operands and a destination) should fit in L1 cache
    /// together. Individual matrices can override it at construction.
    const BLOCK_SIZE: usize = DEFAULT_BLOCK_SIZE;
}

impl FieldElement for f64 {
    const BLOCK_SIZE: usize = REAL_BLOCK_SIZE;
}

impl FieldElement for f32 {
    const BLOCK_SIZE: usize = REAL_BLOCK_SIZE;
}

impl<const P: u64> FieldElement for ModInt<P> {}
