//! Tiled matrix product and matrix-vector products.

use tracing::{debug, trace};

use crate::blocked::BlockMatrix;
use crate::error::{MatrixError, Result};
use crate::field::FieldElement;
use crate::kernels::dot::dot_strided;
use crate::matrix::MatrixAccess;

impl<T: FieldElement> BlockMatrix<T> {
    /// Returns `self * other`.
    ///
    /// Three tiles are live at a time: one of `self`, one of `other` and the
    /// destination. For each destination tile the shared dimension is walked
    /// tile by tile; each destination element receives one partial sum per
    /// k-tile, computed by the 4-way unrolled [`dot_strided`] kernel.
    ///
    /// If `other` is not blocked with the same block size, it is read through
    /// [`MatrixAccess::entry`] while `self` is still walked tile by tile.
    ///
    /// # Errors
    ///
    /// `MatrixDimensionMismatch` if `self.columns() != other.rows()`.
    ///
    /// ```
    /// use blockmat::BlockMatrix;
    ///
    /// let a = BlockMatrix::from_rows_with_block_size(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 2).unwrap();
    /// let b = BlockMatrix::from_rows_with_block_size(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]], 2).unwrap();
    /// let c = a.multiply(&b).unwrap();
    /// assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
    /// ```
    pub fn multiply<M>(&self, other: &M) -> Result<BlockMatrix<T>>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        if self.columns() != other.rows() {
            return Err(MatrixError::shape(
                self.columns(),
                other.columns(),
                other.rows(),
                other.columns(),
            ));
        }
        trace!(
            m = self.rows(),
            n = other.columns(),
            k = self.columns(),
            block_size = self.block_size(),
            "blocked multiply"
        );

        let mut out =
            BlockMatrix::zeros_with_block_size(self.rows(), other.columns(), self.block_size())?;
        match self.compatible(other) {
            Some(m) => self.multiply_blocked(m, &mut out),
            None => {
                debug!("right operand is not block-compatible, reading it entry by entry");
                self.multiply_generic(other, &mut out);
            }
        }
        Ok(out)
    }

    fn multiply_blocked(&self, m: &BlockMatrix<T>, out: &mut BlockMatrix<T>) {
        let t_layout = self.layout;
        let out_layout = out.layout;

        for i_block in 0..out_layout.block_rows() {
            let i_height = out_layout.block_height(i_block);
            for j_block in 0..out_layout.block_columns() {
                let j_width = out_layout.block_width(j_block);
                let out_block = &mut out.blocks[out_layout.block_index(i_block, j_block)];

                // Accumulate over the shared dimension, one k-tile at a time
                for k_block in 0..t_layout.block_columns() {
                    let k_width = t_layout.block_width(k_block);
                    let t_block = self.block(i_block, k_block);
                    let m_block = m.block(k_block, j_block);

                    let mut k = 0;
                    for p in 0..i_height {
                        let t_row = &t_block[p * k_width..(p + 1) * k_width];
                        for n_col in 0..j_width {
                            out_block[k] =
                                out_block[k] + dot_strided(t_row, &m_block[n_col..], j_width);
                            k += 1;
                        }
                    }
                }
            }
        }
    }

    fn multiply_generic<M>(&self, other: &M, out: &mut BlockMatrix<T>)
    where
        M: MatrixAccess<T> + ?Sized,
    {
        let t_layout = self.layout;
        let out_layout = out.layout;

        for i_block in 0..out_layout.block_rows() {
            for j_block in 0..out_layout.block_columns() {
                let q_span = out_layout.column_span(j_block);
                let out_block = &mut out.blocks[out_layout.block_index(i_block, j_block)];

                for k_block in 0..t_layout.block_columns() {
                    let k_span = t_layout.column_span(k_block);
                    let k_width = k_span.len();
                    let t_block = self.block(i_block, k_block);

                    let mut k = 0;
                    for p in 0..out_layout.block_height(i_block) {
                        let t_row = &t_block[p * k_width..(p + 1) * k_width];
                        for q in q_span.clone() {
                            let mut sum = T::zero();
                            for (&t, r) in t_row.iter().zip(k_span.clone()) {
                                sum = sum + t * other.entry(r, q);
                            }
                            out_block[k] = out_block[k] + sum;
                            k += 1;
                        }
                    }
                }
            }
        }
    }

    /// Returns `self * v`.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `v.len() != self.columns()`.
    pub fn operate(&self, v: &[T]) -> Result<Vec<T>> {
        if v.len() != self.columns() {
            return Err(MatrixError::length("operand vector", self.columns(), v.len()));
        }
        let layout = self.layout;
        let mut out = vec![T::zero(); self.rows()];

        for i_block in 0..layout.block_rows() {
            let p_span = layout.row_span(i_block);
            for j_block in 0..layout.block_columns() {
                let q_span = layout.column_span(j_block);
                let j_width = q_span.len();
                let block = self.block(i_block, j_block);
                let v_part = &v[q_span];

                for (i_row, p) in p_span.clone().enumerate() {
                    let row = &block[i_row * j_width..(i_row + 1) * j_width];
                    out[p] = out[p] + dot_strided(row, v_part, 1);
                }
            }
        }
        Ok(out)
    }

    /// Returns `v * self` (row vector times matrix).
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if `v.len() != self.rows()`.
    pub fn pre_multiply(&self, v: &[T]) -> Result<Vec<T>> {
        if v.len() != self.rows() {
            return Err(MatrixError::length("operand vector", self.rows(), v.len()));
        }
        let layout = self.layout;
        let mut out = vec![T::zero(); self.columns()];

        for j_block in 0..layout.block_columns() {
            let q_span = layout.column_span(j_block);
            let j_width = q_span.len();
            for i_block in 0..layout.block_rows() {
                let block = self.block(i_block, j_block);
                let v_part = &v[layout.row_span(i_block)];

                for (j_col, q) in q_span.clone().enumerate() {
                    out[q] = out[q] + dot_strided(v_part, &block[j_col..], j_width);
                }
            }
        }
        Ok(out)
    }

    /// Sum of the diagonal.
    ///
    /// # Errors
    ///
    /// `NotSquare` for rectangular matrices.
    pub fn trace(&self) -> Result<T> {
        self.check_square()?;
        let mut sum = T::zero();
        for i in 0..self.rows() {
            let (block, offset) = self.layout.locate(i, i);
            sum = sum + self.blocks[block][offset];
        }
        Ok(sum)
    }

    /// Returns `self` raised to the power `p` by repeated squaring.
    /// `power(0)` is the identity.
    ///
    /// # Errors
    ///
    /// `NotSquare` for rectangular matrices.
    pub fn power(&self, p: u32) -> Result<BlockMatrix<T>> {
        self.check_square()?;
        let mut result = BlockMatrix::identity_with_block_size(self.rows(), self.block_size())?;
        if p == 0 {
            return Ok(result);
        }

        let mut base = self.clone();
        let mut exponent = p;
        loop {
            if exponent & 1 == 1 {
                result = result.multiply(&base)?;
            }
            exponent >>= 1;
            if exponent == 0 {
                break;
            }
            base = base.multiply(&base)?;
        }
        Ok(result)
    }

    fn check_square(&self) -> Result<()> {
        if !self.is_square() {
            return Err(MatrixError::NotSquare {
                rows: self.rows(),
                columns: self.columns(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::ModInt;
    use crate::matrix::DenseMatrix;

    fn ramp(rows: usize, columns: usize, seed: usize) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|i| {
                (0..columns)
                    .map(|j| ((i * columns + j + seed) % 10) as f64)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn crosses_k_block_boundary() {
        let a = BlockMatrix::from_rows_with_block_size(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 2)
            .unwrap();
        let b = BlockMatrix::from_rows_with_block_size(&[[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]], 2)
            .unwrap();
        let c = a.multiply(&b).unwrap();
        assert_eq!(c.to_rows(), vec![vec![58.0, 64.0], vec![139.0, 154.0]]);
    }

    #[test]
    fn odd_sizes_match_naive() {
        for (m, n, k) in [(3, 3, 3), (5, 7, 9), (7, 3, 5), (11, 13, 17)] {
            let a_rows = ramp(m, k, 1);
            let b_rows = ramp(k, n, 3);
            let a = BlockMatrix::from_rows_with_block_size(&a_rows, 4).unwrap();
            let b = BlockMatrix::from_rows_with_block_size(&b_rows, 4).unwrap();
            let expected = DenseMatrix::from_rows(&a_rows)
                .unwrap()
                .multiply(&DenseMatrix::from_rows(&b_rows).unwrap())
                .unwrap();
            // Small integers: every partial sum is exact.
            assert_eq!(
                a.multiply(&b).unwrap().to_rows(),
                expected.to_rows(),
                "{m}x{n}x{k}"
            );
        }
    }

    #[test]
    fn generic_operand_path() {
        let a_rows = ramp(6, 5, 2);
        let b_rows = ramp(5, 4, 7);
        let a = BlockMatrix::from_rows_with_block_size(&a_rows, 2).unwrap();
        let dense_b = DenseMatrix::from_rows(&b_rows).unwrap();
        let other_size = BlockMatrix::from_rows_with_block_size(&b_rows, 3).unwrap();
        let same_size = BlockMatrix::from_rows_with_block_size(&b_rows, 2).unwrap();

        let expected = a.multiply(&same_size).unwrap();
        assert_eq!(a.multiply(&dense_b).unwrap(), expected);
        assert_eq!(a.multiply(&other_size).unwrap(), expected);
    }

    #[test]
    fn exact_over_modular_field() {
        type F = ModInt<1_000_003>;
        let a_rows: Vec<Vec<F>> = (0..9)
            .map(|i| {
                (0..11)
                    .map(|j| F::new((i * 31 + j * 17) as u64 * 7919))
                    .collect()
            })
            .collect();
        let b_rows: Vec<Vec<F>> = (0..11)
            .map(|i| {
                (0..6)
                    .map(|j| F::new((i * 13 + j * 5) as u64 * 104_729))
                    .collect()
            })
            .collect();
        let a = BlockMatrix::from_rows_with_block_size(&a_rows, 4).unwrap();
        let b = BlockMatrix::from_rows_with_block_size(&b_rows, 4).unwrap();
        let expected = DenseMatrix::from_rows(&a_rows)
            .unwrap()
            .multiply(&DenseMatrix::from_rows(&b_rows).unwrap())
            .unwrap();
        assert_eq!(a.multiply(&b).unwrap().to_rows(), expected.to_rows());
    }

    #[test]
    fn operate_and_pre_multiply() {
        let rows = ramp(7, 5, 4);
        let m = BlockMatrix::from_rows_with_block_size(&rows, 3).unwrap();
        let v: Vec<f64> = (0..5).map(|i| i as f64 - 1.0).collect();
        let expected: Vec<f64> = rows
            .iter()
            .map(|r| r.iter().zip(&v).map(|(a, b)| a * b).sum::<f64>())
            .collect();
        assert_eq!(m.operate(&v).unwrap(), expected);

        let u: Vec<f64> = (0..7).map(|i| 2.0 - i as f64).collect();
        let expected: Vec<f64> = (0..5)
            .map(|j| (0..7).map(|i| u[i] * rows[i][j]).sum::<f64>())
            .collect();
        assert_eq!(m.pre_multiply(&u).unwrap(), expected);

        assert_eq!(
            m.operate(&u),
            Err(MatrixError::length("operand vector", 5, 7))
        );
    }

    #[test]
    fn dimension_mismatch() {
        let a = BlockMatrix::<f64>::zeros(2, 3).unwrap();
        let b = BlockMatrix::<f64>::zeros(2, 3).unwrap();
        assert_eq!(
            a.multiply(&b).unwrap_err(),
            MatrixError::MatrixDimensionMismatch {
                expected_rows: 3,
                expected_columns: 3,
                actual_rows: 2,
                actual_columns: 3,
            }
        );
    }

    #[test]
    fn power_and_trace() {
        let m = BlockMatrix::from_rows_with_block_size(&[[1.0, 1.0], [1.0, 0.0]], 1).unwrap();
        // Fibonacci: [[F(n+1), F(n)], [F(n), F(n-1)]]
        let p = m.power(10).unwrap();
        assert_eq!(p.to_rows(), vec![vec![89.0, 55.0], vec![55.0, 34.0]]);
        assert_eq!(p.trace().unwrap(), 123.0);
        assert_eq!(
            m.power(0).unwrap(),
            BlockMatrix::identity_with_block_size(2, 1).unwrap()
        );

        let rect = BlockMatrix::<f64>::zeros(2, 3).unwrap();
        assert_eq!(
            rect.power(2).unwrap_err(),
            MatrixError::NotSquare {
                rows: 2,
                columns: 3
            }
        );
    }
}
