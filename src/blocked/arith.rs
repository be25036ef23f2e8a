//! Element-wise arithmetic.
//!
//! With two compatibly blocked operands the tiles line up one to one, so
//! every operation is a flat loop over matching buffers. Any other operand
//! is read through [`MatrixAccess::entry`] with the global coordinates of
//! each flat position rebuilt from the tile spans.

use tracing::debug;

use crate::blocked::BlockMatrix;
use crate::error::{MatrixError, Result};
use crate::field::FieldElement;
use crate::matrix::MatrixAccess;

impl<T: FieldElement> BlockMatrix<T> {
    /// `self + other`.
    pub fn add<M>(&self, other: &M) -> Result<BlockMatrix<T>>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        self.combine(other, |x, y| x + y)
    }

    /// `self - other`.
    pub fn subtract<M>(&self, other: &M) -> Result<BlockMatrix<T>>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        self.combine(other, |x, y| x - y)
    }

    /// Adds `d` to every entry.
    pub fn scalar_add(&self, d: T) -> BlockMatrix<T> {
        self.map(|x| x + d)
    }

    /// Multiplies every entry by `d`.
    pub fn scalar_multiply(&self, d: T) -> BlockMatrix<T> {
        self.map(|x| x * d)
    }

    fn map(&self, f: impl Fn(T) -> T) -> BlockMatrix<T> {
        let mut out = self.zeros_like();
        for (out_block, t_block) in out.blocks.iter_mut().zip(&self.blocks) {
            for (o, &t) in out_block.iter_mut().zip(t_block) {
                *o = f(t);
            }
        }
        out
    }

    fn combine<M>(&self, other: &M, f: impl Fn(T, T) -> T) -> Result<BlockMatrix<T>>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        self.check_same_shape(other)?;
        let mut out = self.zeros_like();

        if let Some(m) = self.compatible(other) {
            for ((out_block, t_block), m_block) in
                out.blocks.iter_mut().zip(&self.blocks).zip(&m.blocks)
            {
                for ((o, &t), &u) in out_block.iter_mut().zip(t_block).zip(m_block) {
                    *o = f(t, u);
                }
            }
            return Ok(out);
        }

        debug!(
            rows = self.rows(),
            columns = self.columns(),
            "element-wise op on non-blocked operand, reading entries one by one"
        );
        let layout = self.layout;
        for i_block in 0..layout.block_rows() {
            for j_block in 0..layout.block_columns() {
                let index = layout.block_index(i_block, j_block);
                let out_block = &mut out.blocks[index];
                let t_block = &self.blocks[index];
                let mut k = 0;
                for p in layout.row_span(i_block) {
                    for q in layout.column_span(j_block) {
                        out_block[k] = f(t_block[k], other.entry(p, q));
                        k += 1;
                    }
                }
            }
        }
        Ok(out)
    }

    pub(crate) fn check_same_shape<M>(&self, other: &M) -> Result<()>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        if other.rows() != self.rows() || other.columns() != self.columns() {
            return Err(MatrixError::shape(
                self.rows(),
                self.columns(),
                other.rows(),
                other.columns(),
            ));
        }
        Ok(())
    }
}
