//! Tile-wise transposition.

use crate::blocked::BlockMatrix;
use crate::field::FieldElement;

impl<T: FieldElement> BlockMatrix<T> {
    /// Returns the transpose, with the same block size.
    ///
    /// Output tile (i, j) is the transpose of source tile (j, i). Inside a
    /// tile the destination is written sequentially while the source is read
    /// with a stride of the source tile's width, so both sides stay within
    /// one tile's worth of cache.
    ///
    /// ```
    /// use blockmat::BlockMatrix;
    ///
    /// let m = BlockMatrix::from_rows_with_block_size(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 2)
    ///     .unwrap();
    /// let t = m.transpose();
    /// assert_eq!(t.to_rows(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    /// ```
    pub fn transpose(&self) -> BlockMatrix<T> {
        let out_layout = self.layout.transposed();
        let mut out = BlockMatrix::zeros_in(out_layout);

        for i_block in 0..out_layout.block_rows() {
            for j_block in 0..out_layout.block_columns() {
                let out_block = &mut out.blocks[out_layout.block_index(i_block, j_block)];
                let t_block = self.block(j_block, i_block);

                // Source tile width == destination tile height
                let l_inc = out_layout.block_height(i_block);
                let j_width = out_layout.block_width(j_block);

                let mut k = 0;
                for p in 0..l_inc {
                    let mut l = p;
                    for _ in 0..j_width {
                        out_block[k] = t_block[l];
                        k += 1;
                        l += l_inc;
                    }
                }
            }
        }

        out
    }
}
