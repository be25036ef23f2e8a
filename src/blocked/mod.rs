//! Cache-blocked dense matrices.
//!
//! A [`BlockMatrix`] is cut into square tiles of `block_size × block_size`
//! elements (narrower/shorter at the trailing edges). Each tile is one
//! contiguous row-major buffer and tiles are stored in row-major grid order.
//! Row walks, column walks, transposition and multiplication then touch a
//! few tiles at a time instead of striding across whole rows.
//!
//! Layout:
//! - `layout`: block-index arithmetic
//! - `convert`: raw rows ⇄ tiles
//! - `arith`: element-wise add/subtract/scalar ops
//! - `multiply`: tiled product, matrix×vector, vector×matrix
//! - `region`: rows, columns and sub-matrices spanning tile boundaries
//! - `transpose`: tile-wise transposition
//! - `walk`: visitor traversal in row, column or tile order
//! - `real`: norms for `f64` matrices

pub mod arith;
pub mod convert;
pub mod layout;
pub mod multiply;
pub mod real;
pub mod region;
pub mod transpose;
pub mod walk;

use crate::error::{Axis, MatrixError, Result};
use crate::field::FieldElement;
use crate::matrix::MatrixAccess;

use convert::{create_blocks_layout, from_blocks_layout, to_blocks_layout};
use layout::BlockLayout;

/// Dense matrix stored as a grid of contiguous tiles.
///
/// Operations that keep the shape mutate in place; operations that produce
/// a new shape (product, transpose, sub-matrix) return a new matrix with the
/// same block size.
///
/// ```
/// use blockmat::BlockMatrix;
///
/// let m = BlockMatrix::from_rows_with_block_size(
///     &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
///     2,
/// )
/// .unwrap();
/// assert_eq!(m.block(1, 1), &[9.0]);
/// assert_eq!(m.get_entry(2, 2).unwrap(), 9.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BlockMatrix<T> {
    layout: BlockLayout,
    blocks: Vec<Vec<T>>,
}

impl<T: FieldElement> BlockMatrix<T> {
    /// Zero-filled matrix with the element type's default block size.
    pub fn zeros(rows: usize, columns: usize) -> Result<Self> {
        Self::zeros_with_block_size(rows, columns, T::BLOCK_SIZE)
    }

    pub fn zeros_with_block_size(rows: usize, columns: usize, block_size: usize) -> Result<Self> {
        Ok(Self::zeros_in(BlockLayout::new(rows, columns, block_size)?))
    }

    pub(crate) fn zeros_in(layout: BlockLayout) -> Self {
        Self {
            blocks: create_blocks_layout(&layout),
            layout,
        }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Result<Self> {
        Self::identity_with_block_size(n, T::BLOCK_SIZE)
    }

    pub fn identity_with_block_size(n: usize, block_size: usize) -> Result<Self> {
        let mut m = Self::zeros_with_block_size(n, n, block_size)?;
        for i in 0..n {
            let (block, offset) = m.layout.locate(i, i);
            m.blocks[block][offset] = T::one();
        }
        Ok(m)
    }

    /// Copies a rectangular array of rows, using the default block size.
    ///
    /// # Errors
    ///
    /// `NoData` if `raw` is empty or its rows are empty, `DimensionMismatch`
    /// if rows differ in length.
    pub fn from_rows<R: AsRef<[T]>>(raw: &[R]) -> Result<Self> {
        Self::from_rows_with_block_size(raw, T::BLOCK_SIZE)
    }

    pub fn from_rows_with_block_size<R: AsRef<[T]>>(raw: &[R], block_size: usize) -> Result<Self> {
        let (layout, blocks) = to_blocks_layout(raw, block_size)?;
        Ok(Self { layout, blocks })
    }

    /// Copies tiles that are already in blocked layout.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the tile count or any tile length disagrees
    /// with `layout`.
    pub fn from_blocks(layout: BlockLayout, blocks: &[Vec<T>]) -> Result<Self> {
        check_blocks(&layout, blocks)?;
        Ok(Self {
            layout,
            blocks: blocks.to_vec(),
        })
    }

    /// Takes the caller's tile buffers as storage without copying them.
    ///
    /// This is the zero-copy constructor: the vectors are moved in, so the
    /// caller keeps no alias to mutate behind the matrix's back. Use
    /// [`into_blocks`](Self::into_blocks) to get them back.
    ///
    /// # Errors
    ///
    /// Same checks as [`from_blocks`](Self::from_blocks).
    pub fn adopt_blocks(layout: BlockLayout, blocks: Vec<Vec<T>>) -> Result<Self> {
        check_blocks(&layout, &blocks)?;
        Ok(Self { layout, blocks })
    }

    /// Same shape and block size, zero-filled.
    pub(crate) fn zeros_like(&self) -> Self {
        Self::zeros_in(self.layout)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.rows()
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.layout.columns()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.layout.block_size()
    }

    #[inline]
    pub fn layout(&self) -> &BlockLayout {
        &self.layout
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.columns()
    }

    /// Tile (`i_block`, `j_block`), row-major.
    ///
    /// # Panics
    ///
    /// Panics if the tile index is outside the grid.
    pub fn block(&self, i_block: usize, j_block: usize) -> &[T] {
        &self.blocks[self.layout.block_index(i_block, j_block)]
    }

    /// Mutable tile (`i_block`, `j_block`).
    ///
    /// # Panics
    ///
    /// Panics if the tile index is outside the grid.
    pub fn block_mut(&mut self, i_block: usize, j_block: usize) -> &mut [T] {
        let index = self.layout.block_index(i_block, j_block);
        &mut self.blocks[index]
    }

    /// All tiles in grid order.
    pub fn blocks(&self) -> &[Vec<T>] {
        &self.blocks
    }

    /// Gives the tile buffers back to the caller.
    pub fn into_blocks(self) -> Vec<Vec<T>> {
        self.blocks
    }

    /// Materializes the matrix as raw rows.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        from_blocks_layout(&self.layout, &self.blocks)
    }

    /// The blocked view of `other` if it tiles compatibly with `self`
    /// (same block size), so tile index arithmetic carries over.
    pub(crate) fn compatible<'a, M>(&self, other: &'a M) -> Option<&'a BlockMatrix<T>>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        other
            .as_blocked()
            .filter(|b| b.block_size() == self.block_size())
    }

    pub fn get_entry(&self, row: usize, column: usize) -> Result<T> {
        self.check_row_index(row)?;
        self.check_column_index(column)?;
        let (block, offset) = self.layout.locate(row, column);
        Ok(self.blocks[block][offset])
    }

    pub fn set_entry(&mut self, row: usize, column: usize, value: T) -> Result<()> {
        self.check_row_index(row)?;
        self.check_column_index(column)?;
        let (block, offset) = self.layout.locate(row, column);
        self.blocks[block][offset] = value;
        Ok(())
    }

    /// Adds `increment` to the entry at (`row`, `column`).
    pub fn add_to_entry(&mut self, row: usize, column: usize, increment: T) -> Result<()> {
        self.check_row_index(row)?;
        self.check_column_index(column)?;
        let (block, offset) = self.layout.locate(row, column);
        let slot = &mut self.blocks[block][offset];
        *slot = *slot + increment;
        Ok(())
    }

    /// Multiplies the entry at (`row`, `column`) by `factor`.
    pub fn multiply_entry(&mut self, row: usize, column: usize, factor: T) -> Result<()> {
        self.check_row_index(row)?;
        self.check_column_index(column)?;
        let (block, offset) = self.layout.locate(row, column);
        let slot = &mut self.blocks[block][offset];
        *slot = *slot * factor;
        Ok(())
    }

    pub(crate) fn check_row_index(&self, row: usize) -> Result<()> {
        if row >= self.rows() {
            return Err(MatrixError::OutOfRange {
                axis: Axis::Row,
                index: row,
                bound: self.rows(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_column_index(&self, column: usize) -> Result<()> {
        if column >= self.columns() {
            return Err(MatrixError::OutOfRange {
                axis: Axis::Column,
                index: column,
                bound: self.columns(),
            });
        }
        Ok(())
    }

    /// Validates an inclusive rectangle.
    pub(crate) fn check_sub_matrix_index(
        &self,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<()> {
        self.check_row_index(start_row)?;
        self.check_row_index(end_row)?;
        if end_row < start_row {
            return Err(MatrixError::InvalidRange {
                axis: Axis::Row,
                start: start_row,
                end: end_row,
            });
        }
        self.check_column_index(start_column)?;
        self.check_column_index(end_column)?;
        if end_column < start_column {
            return Err(MatrixError::InvalidRange {
                axis: Axis::Column,
                start: start_column,
                end: end_column,
            });
        }
        Ok(())
    }
}

fn check_blocks<T>(layout: &BlockLayout, blocks: &[Vec<T>]) -> Result<()> {
    if blocks.len() != layout.block_count() {
        return Err(MatrixError::length("block count", layout.block_count(), blocks.len()));
    }
    for i_block in 0..layout.block_rows() {
        for j_block in 0..layout.block_columns() {
            let expected = layout.tile_len(i_block, j_block);
            let actual = blocks[layout.block_index(i_block, j_block)].len();
            if actual != expected {
                return Err(MatrixError::length(
                    format!("block ({i_block}, {j_block})"),
                    expected,
                    actual,
                ));
            }
        }
    }
    Ok(())
}

impl<T: FieldElement> MatrixAccess<T> for BlockMatrix<T> {
    fn rows(&self) -> usize {
        self.layout.rows()
    }

    fn columns(&self) -> usize {
        self.layout.columns()
    }

    fn entry(&self, row: usize, column: usize) -> T {
        let (block, offset) = self.layout.locate(row, column);
        self.blocks[block][offset]
    }

    fn as_blocked(&self) -> Option<&BlockMatrix<T>> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_3x3() -> BlockMatrix<f64> {
        BlockMatrix::from_rows_with_block_size(
            &[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]],
            2,
        )
        .unwrap()
    }

    #[test]
    fn trailing_1x1_tile_addressed() {
        let m = sample_3x3();
        assert_eq!(m.block(0, 0), &[1.0, 2.0, 4.0, 5.0]);
        assert_eq!(m.block(0, 1), &[3.0, 6.0]);
        assert_eq!(m.block(1, 0), &[7.0, 8.0]);
        assert_eq!(m.block(1, 1), &[9.0]);
        assert_eq!(m.get_entry(2, 2).unwrap(), 9.0);
    }

    #[test]
    fn entry_updates() {
        let mut m = sample_3x3();
        m.set_entry(2, 1, 10.0).unwrap();
        m.add_to_entry(0, 2, 0.5).unwrap();
        m.multiply_entry(1, 1, 2.0).unwrap();
        assert_eq!(m.get_entry(2, 1).unwrap(), 10.0);
        assert_eq!(m.get_entry(0, 2).unwrap(), 3.5);
        assert_eq!(m.get_entry(1, 1).unwrap(), 10.0);
    }

    #[test]
    fn entry_out_of_range() {
        let m = sample_3x3();
        assert_eq!(
            m.get_entry(3, 0),
            Err(MatrixError::OutOfRange {
                axis: Axis::Row,
                index: 3,
                bound: 3
            })
        );
        assert_eq!(
            m.get_entry(0, 5),
            Err(MatrixError::OutOfRange {
                axis: Axis::Column,
                index: 5,
                bound: 3
            })
        );
    }

    #[test]
    fn adopt_keeps_buffers_and_checks_lengths() {
        let layout = BlockLayout::new(3, 3, 2).unwrap();
        let blocks = vec![
            vec![1.0, 2.0, 4.0, 5.0],
            vec![3.0, 6.0],
            vec![7.0, 8.0],
            vec![9.0],
        ];
        let m = BlockMatrix::adopt_blocks(layout, blocks.clone()).unwrap();
        assert_eq!(m, sample_3x3());
        assert_eq!(m.into_blocks(), blocks);

        let bad = vec![vec![1.0; 4], vec![0.0; 2], vec![0.0; 2], vec![0.0; 2]];
        match BlockMatrix::adopt_blocks(layout, bad) {
            Err(MatrixError::DimensionMismatch {
                what,
                expected,
                actual,
            }) => {
                assert_eq!(what, "block (1, 1)");
                assert_eq!((expected, actual), (1, 2));
            }
            other => panic!("unexpected {other:?}"),
        }

        let short: Vec<Vec<f64>> = vec![vec![0.0; 4]];
        assert!(BlockMatrix::from_blocks(layout, &short).is_err());
    }

    #[test]
    fn block_mut_writes_through_to_entries() {
        let mut m = sample_3x3();
        m.block_mut(1, 0).copy_from_slice(&[-7.0, -8.0]);
        m.block_mut(1, 1)[0] = 0.0;
        assert_eq!(m.get_row(2).unwrap(), vec![-7.0, -8.0, 0.0]);
        assert_eq!(m.get_entry(1, 1).unwrap(), 5.0);
    }

    #[test]
    fn identity_diagonal_crosses_tiles() {
        let m: BlockMatrix<f64> = BlockMatrix::identity_with_block_size(5, 2).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(m.get_entry(i, j).unwrap(), expected);
            }
        }
    }

    #[test]
    fn zero_dimensions_rejected() {
        assert_eq!(
            BlockMatrix::<f64>::zeros(0, 4),
            Err(MatrixError::NotStrictlyPositive {
                rows: 0,
                columns: 4
            })
        );
    }
}
