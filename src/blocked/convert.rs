//! Conversion between raw row-major rows and the blocked layout.

use tracing::trace;

use crate::blocked::layout::BlockLayout;
use crate::error::{MatrixError, Result};
use crate::field::FieldElement;

/// Splits a rectangular array of rows into tiles.
///
/// Each tile receives one bulk copy per source row it covers.
///
/// # Errors
///
/// `NoData` when `raw` has no rows or zero-length rows, `DimensionMismatch`
/// naming the first row whose length differs from row 0.
pub fn to_blocks_layout<T, R>(raw: &[R], block_size: usize) -> Result<(BlockLayout, Vec<Vec<T>>)>
where
    T: Copy,
    R: AsRef<[T]>,
{
    let first = raw.first().ok_or(MatrixError::NoData("no rows"))?;
    let columns = first.as_ref().len();
    if columns == 0 {
        return Err(MatrixError::NoData("no columns"));
    }
    for (i, row) in raw.iter().enumerate() {
        let len = row.as_ref().len();
        if len != columns {
            return Err(MatrixError::length(format!("row {i}"), columns, len));
        }
    }

    let layout = BlockLayout::new(raw.len(), columns, block_size)?;
    trace!(
        rows = layout.rows(),
        columns,
        block_size,
        "converting raw rows to blocks"
    );

    let mut blocks = Vec::with_capacity(layout.block_count());
    for i_block in 0..layout.block_rows() {
        let rows = layout.row_span(i_block);
        for j_block in 0..layout.block_columns() {
            let cols = layout.column_span(j_block);
            let mut block = Vec::with_capacity(layout.tile_len(i_block, j_block));
            for p in rows.clone() {
                block.extend_from_slice(&raw[p].as_ref()[cols.clone()]);
            }
            blocks.push(block);
        }
    }

    Ok((layout, blocks))
}

/// Allocates zero-filled tiles for `layout`.
pub fn create_blocks_layout<T: FieldElement>(layout: &BlockLayout) -> Vec<Vec<T>> {
    trace!(
        rows = layout.rows(),
        columns = layout.columns(),
        block_size = layout.block_size(),
        "allocating block layout"
    );
    let mut blocks = Vec::with_capacity(layout.block_count());
    for i_block in 0..layout.block_rows() {
        for j_block in 0..layout.block_columns() {
            blocks.push(vec![T::zero(); layout.tile_len(i_block, j_block)]);
        }
    }
    blocks
}

/// Reassembles tiles into raw rows.
///
/// `blocks` must match `layout`; this is not checked.
pub fn from_blocks_layout<T: Copy>(layout: &BlockLayout, blocks: &[Vec<T>]) -> Vec<Vec<T>> {
    let mut raw = Vec::with_capacity(layout.rows());
    for i_block in 0..layout.block_rows() {
        let rows = layout.row_span(i_block);
        for p in rows.clone() {
            let i_row = p - rows.start;
            let mut row = Vec::with_capacity(layout.columns());
            for j_block in 0..layout.block_columns() {
                let j_width = layout.block_width(j_block);
                let block = &blocks[layout.block_index(i_block, j_block)];
                let start = i_row * j_width;
                row.extend_from_slice(&block[start..start + j_width]);
            }
            raw.push(row);
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiles_of_a_3x3_with_block_size_2() {
        let raw = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let (layout, blocks) = to_blocks_layout(&raw, 2).unwrap();
        assert_eq!(layout.block_count(), 4);
        assert_eq!(blocks[0], vec![1.0, 2.0, 4.0, 5.0]);
        assert_eq!(blocks[1], vec![3.0, 6.0]);
        assert_eq!(blocks[2], vec![7.0, 8.0]);
        assert_eq!(blocks[3], vec![9.0]);
    }

    #[test]
    fn round_trip_irregular() {
        let raw: Vec<Vec<f64>> = (0..37)
            .map(|i| (0..53).map(|j| (i * 53 + j) as f64 * 0.5).collect())
            .collect();
        let (layout, blocks) = to_blocks_layout(&raw, 36).unwrap();
        assert_eq!(from_blocks_layout(&layout, &blocks), raw);
    }

    #[test]
    fn create_matches_tile_shapes() {
        let layout = BlockLayout::new(5, 3, 2).unwrap();
        let blocks: Vec<Vec<f64>> = create_blocks_layout(&layout);
        let lens: Vec<usize> = blocks.iter().map(Vec::len).collect();
        assert_eq!(lens, vec![4, 2, 4, 2, 2, 1]);
        assert!(blocks.iter().flatten().all(|&x| x == 0.0));
    }

    #[test]
    fn rejects_jagged_and_empty() {
        let jagged = vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0]];
        match to_blocks_layout(&jagged, 2) {
            Err(MatrixError::DimensionMismatch {
                what,
                expected,
                actual,
            }) => {
                assert_eq!(what, "row 2");
                assert_eq!((expected, actual), (2, 1));
            }
            other => panic!("unexpected {other:?}"),
        }

        let empty: Vec<Vec<f64>> = Vec::new();
        assert_eq!(
            to_blocks_layout(&empty, 2).unwrap_err(),
            MatrixError::NoData("no rows")
        );
        let no_columns: Vec<Vec<f64>> = vec![Vec::new()];
        assert_eq!(
            to_blocks_layout(&no_columns, 2).unwrap_err(),
            MatrixError::NoData("no columns")
        );
    }
}
