//! Block-index arithmetic.
//!
//! Three coordinate systems meet here: global (row, column), block grid
//! (block row, block column) and the flat offset inside one tile. All
//! functions are O(1) and unchecked; callers validate indices first.

use std::ops::Range;

use crate::error::{MatrixError, Result};

/// Shape of a blocked matrix: its dimensions and the tile grid covering it.
///
/// Tiles are `block_size × block_size` except in the last block row (shorter)
/// and last block column (narrower) when the dimension is not a multiple of
/// the block size.
///
/// ```
/// use blockmat::BlockLayout;
///
/// let layout = BlockLayout::new(3, 3, 2).unwrap();
/// assert_eq!((layout.block_rows(), layout.block_columns()), (2, 2));
/// assert_eq!(layout.block_height(1), 1);
/// // (2, 2) is the only element of the trailing 1×1 tile.
/// assert_eq!(layout.locate(2, 2), (3, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    rows: usize,
    columns: usize,
    block_size: usize,
    block_rows: usize,
    block_columns: usize,
}

impl BlockLayout {
    pub fn new(rows: usize, columns: usize, block_size: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(MatrixError::NotStrictlyPositive { rows, columns });
        }
        if block_size == 0 {
            return Err(MatrixError::InvalidBlockSize(block_size));
        }
        Ok(Self {
            rows,
            columns,
            block_size,
            block_rows: rows.div_ceil(block_size),
            block_columns: columns.div_ceil(block_size),
        })
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.columns
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn block_rows(&self) -> usize {
        self.block_rows
    }

    #[inline]
    pub fn block_columns(&self) -> usize {
        self.block_columns
    }

    /// Total number of tiles.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.block_rows * self.block_columns
    }

    /// Height of the tiles in block row `i_block`.
    #[inline]
    pub fn block_height(&self, i_block: usize) -> usize {
        if i_block == self.block_rows - 1 {
            self.rows - i_block * self.block_size
        } else {
            self.block_size
        }
    }

    /// Width of the tiles in block column `j_block`.
    #[inline]
    pub fn block_width(&self, j_block: usize) -> usize {
        if j_block == self.block_columns - 1 {
            self.columns - j_block * self.block_size
        } else {
            self.block_size
        }
    }

    /// Position of tile (`i_block`, `j_block`) in the row-major tile list.
    #[inline]
    pub fn block_index(&self, i_block: usize, j_block: usize) -> usize {
        i_block * self.block_columns + j_block
    }

    /// Number of elements in tile (`i_block`, `j_block`).
    #[inline]
    pub fn tile_len(&self, i_block: usize, j_block: usize) -> usize {
        self.block_height(i_block) * self.block_width(j_block)
    }

    /// Global rows covered by block row `i_block`.
    #[inline]
    pub fn row_span(&self, i_block: usize) -> Range<usize> {
        let start = i_block * self.block_size;
        start..(start + self.block_size).min(self.rows)
    }

    /// Global columns covered by block column `j_block`.
    #[inline]
    pub fn column_span(&self, j_block: usize) -> Range<usize> {
        let start = j_block * self.block_size;
        start..(start + self.block_size).min(self.columns)
    }

    /// Maps (`row`, `column`) to (tile index, offset inside the tile).
    #[inline]
    pub fn locate(&self, row: usize, column: usize) -> (usize, usize) {
        let i_block = row / self.block_size;
        let j_block = column / self.block_size;
        let offset = (row - i_block * self.block_size) * self.block_width(j_block)
            + (column - j_block * self.block_size);
        (self.block_index(i_block, j_block), offset)
    }

    /// Layout of the transposed matrix, same block size.
    pub fn transposed(&self) -> Self {
        Self {
            rows: self.columns,
            columns: self.rows,
            block_size: self.block_size,
            block_rows: self.block_columns,
            block_columns: self.block_rows,
        }
    }
}
