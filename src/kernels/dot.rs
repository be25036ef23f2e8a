//! Unrolled dot-product microkernel.
//!
//! Every blocked product in this crate bottoms out here: the tile-by-tile
//! multiply, `operate` and `pre_multiply` each reduce one contiguous run of
//! elements against one strided run.

use crate::field::FieldElement;

/// Computes `sum(lhs[i] * rhs[i * stride])` for `i in 0..lhs.len()`.
///
/// The main loop consumes four terms per iteration, then a scalar loop
/// handles the 0-3 leftovers. Terms are still added strictly left to right
/// (`((sum + t0) + t1) + ...`), so the result is bit-identical to
/// [`dot_strided_reference`] even for floats.
///
/// `rhs` must hold at least `(lhs.len() - 1) * stride + 1` elements.
#[inline]
pub fn dot_strided<T: FieldElement>(lhs: &[T], rhs: &[T], stride: usize) -> T {
    let len = lhs.len();
    let stride2 = stride * 2;
    let stride3 = stride * 3;
    let stride4 = stride * 4;

    let mut sum = T::zero();
    let mut l = 0;
    let mut n = 0;

    // Four terms at a time
    while l + 3 < len {
        sum = sum
            + lhs[l] * rhs[n]
            + lhs[l + 1] * rhs[n + stride]
            + lhs[l + 2] * rhs[n + stride2]
            + lhs[l + 3] * rhs[n + stride3];
        l += 4;
        n += stride4;
    }

    // Tail
    while l < len {
        sum = sum + lhs[l] * rhs[n];
        l += 1;
        n += stride;
    }

    sum
}

/// One term per iteration; the baseline [`dot_strided`] must match.
pub fn dot_strided_reference<T: FieldElement>(lhs: &[T], rhs: &[T], stride: usize) -> T {
    let mut sum = T::zero();
    for (i, &x) in lhs.iter().enumerate() {
        sum = sum + x * rhs[i * stride];
    }
    sum
}
