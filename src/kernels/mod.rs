//! Microkernels for the inner loops of the blocked products.
//!
//! Available kernels:
//! - `dot`: strided dot product unrolled by 4, shared by matrix×matrix,
//!   matrix×vector and vector×matrix

pub mod dot;
