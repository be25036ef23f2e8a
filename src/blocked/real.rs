//! Extras for `f64` matrices that need an absolute value or a square root.

use crate::blocked::BlockMatrix;
use crate::error::Result;
use crate::matrix::MatrixAccess;

impl BlockMatrix<f64> {
    /// Maximum absolute column sum (the induced 1-norm).
    pub fn norm(&self) -> f64 {
        let layout = self.layout;
        let mut max_column_sum: f64 = 0.0;
        let mut column_sums = Vec::with_capacity(layout.block_size());

        for j_block in 0..layout.block_columns() {
            let j_width = layout.block_width(j_block);
            column_sums.clear();
            column_sums.resize(j_width, 0.0);
            for i_block in 0..layout.block_rows() {
                let block = self.block(i_block, j_block);
                for row in block.chunks_exact(j_width) {
                    for (sum, value) in column_sums.iter_mut().zip(row) {
                        *sum += value.abs();
                    }
                }
            }
            for &sum in &column_sums {
                max_column_sum = max_column_sum.max(sum);
            }
        }
        max_column_sum
    }

    /// Square root of the sum of squared entries.
    pub fn frobenius_norm(&self) -> f64 {
        self.blocks
            .iter()
            .flatten()
            .map(|x| x * x)
            .sum::<f64>()
            .sqrt()
    }

    /// Largest `|self[i][j] - other[i][j]|`.
    ///
    /// # Errors
    ///
    /// `MatrixDimensionMismatch` if the shapes differ.
    pub fn max_abs_difference<M>(&self, other: &M) -> Result<f64>
    where
        M: MatrixAccess<f64> + ?Sized,
    {
        let diff = self.subtract(other)?;
        Ok(diff
            .blocks
            .iter()
            .flatten()
            .fold(0.0_f64, |acc, x| acc.max(x.abs())))
    }
}
