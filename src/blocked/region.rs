//! Rows, columns and rectangular regions.
//!
//! A region of the matrix rarely lines up with tile boundaries. Every
//! operation here translates the requested global rectangle into the tiles
//! it touches and copies one contiguous run per (row, tile) pair.

use tracing::debug;

use crate::blocked::BlockMatrix;
use crate::blocked::layout::BlockLayout;
use crate::error::{MatrixError, Result};
use crate::field::FieldElement;
use crate::matrix::MatrixAccess;

/// Copies the rectangle `[src_start_row, src_end_row) × [src_start_column,
/// src_end_column)` of a tile into another tile at (`dst_start_row`,
/// `dst_start_column`).
///
/// A sub-rectangle of a row-major tile is not contiguous, so this is one
/// slice copy per row. Unchecked: the caller guarantees both rectangles fit.
#[allow(clippy::too_many_arguments)]
pub(crate) fn copy_block_part<T: Copy>(
    src: &[T],
    src_width: usize,
    src_start_row: usize,
    src_end_row: usize,
    src_start_column: usize,
    src_end_column: usize,
    dst: &mut [T],
    dst_width: usize,
    dst_start_row: usize,
    dst_start_column: usize,
) {
    let length = src_end_column - src_start_column;
    let mut src_pos = src_start_row * src_width + src_start_column;
    let mut dst_pos = dst_start_row * dst_width + dst_start_column;
    for _ in src_start_row..src_end_row {
        dst[dst_pos..dst_pos + length].copy_from_slice(&src[src_pos..src_pos + length]);
        src_pos += src_width;
        dst_pos += dst_width;
    }
}

impl<T: FieldElement> BlockMatrix<T> {
    /// Extracts rows `start_row..=end_row` and columns
    /// `start_column..=end_column` as a new matrix with the same block size.
    ///
    /// The output tiles are aligned to the output's own origin, so each of
    /// them overlaps one or two source tiles per axis. The four overlap cases
    /// (1×1, 1×2, 2×1, 2×2) become one to four [`copy_block_part`] calls.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if a bound lies outside the matrix, `InvalidRange` if an
    /// end precedes its start.
    ///
    /// ```
    /// use blockmat::BlockMatrix;
    ///
    /// let rows: Vec<Vec<f64>> = (0..4)
    ///     .map(|i| (0..4).map(|j| (4 * i + j) as f64).collect())
    ///     .collect();
    /// let m = BlockMatrix::from_rows_with_block_size(&rows, 2).unwrap();
    /// let sub = m.get_sub_matrix(1, 2, 1, 2).unwrap();
    /// assert_eq!(sub.to_rows(), vec![vec![5.0, 6.0], vec![9.0, 10.0]]);
    /// ```
    pub fn get_sub_matrix(
        &self,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<BlockMatrix<T>> {
        self.check_sub_matrix_index(start_row, end_row, start_column, end_column)?;

        let bs = self.block_size();
        let src = self.layout;
        let out_layout =
            BlockLayout::new(end_row - start_row + 1, end_column - start_column + 1, bs)?;
        let mut out = BlockMatrix::zeros_in(out_layout);

        let block_start_row = start_row / bs;
        let row_shift = start_row % bs;
        let block_start_column = start_column / bs;
        let column_shift = start_column % bs;

        for i_block in 0..out_layout.block_rows() {
            let i_height = out_layout.block_height(i_block);
            let p_block = block_start_row + i_block;

            for j_block in 0..out_layout.block_columns() {
                let j_width = out_layout.block_width(j_block);
                let q_block = block_start_column + j_block;

                let out_block = &mut out.blocks[out_layout.block_index(i_block, j_block)];
                let index = src.block_index(p_block, q_block);
                let width = src.block_width(q_block);

                // A spill past the first source tile means that tile is a full one.
                let height_excess = (i_height + row_shift).saturating_sub(bs);
                let width_excess = (j_width + column_shift).saturating_sub(bs);

                match (height_excess > 0, width_excess > 0) {
                    (true, true) => {
                        let width2 = src.block_width(q_block + 1);
                        let below = index + src.block_columns();
                        copy_block_part(
                            &self.blocks[index],
                            width,
                            row_shift,
                            bs,
                            column_shift,
                            bs,
                            out_block,
                            j_width,
                            0,
                            0,
                        );
                        copy_block_part(
                            &self.blocks[index + 1],
                            width2,
                            row_shift,
                            bs,
                            0,
                            width_excess,
                            out_block,
                            j_width,
                            0,
                            j_width - width_excess,
                        );
                        copy_block_part(
                            &self.blocks[below],
                            width,
                            0,
                            height_excess,
                            column_shift,
                            bs,
                            out_block,
                            j_width,
                            i_height - height_excess,
                            0,
                        );
                        copy_block_part(
                            &self.blocks[below + 1],
                            width2,
                            0,
                            height_excess,
                            0,
                            width_excess,
                            out_block,
                            j_width,
                            i_height - height_excess,
                            j_width - width_excess,
                        );
                    }
                    (true, false) => {
                        let below = index + src.block_columns();
                        copy_block_part(
                            &self.blocks[index],
                            width,
                            row_shift,
                            bs,
                            column_shift,
                            j_width + column_shift,
                            out_block,
                            j_width,
                            0,
                            0,
                        );
                        copy_block_part(
                            &self.blocks[below],
                            width,
                            0,
                            height_excess,
                            column_shift,
                            j_width + column_shift,
                            out_block,
                            j_width,
                            i_height - height_excess,
                            0,
                        );
                    }
                    (false, true) => {
                        let width2 = src.block_width(q_block + 1);
                        copy_block_part(
                            &self.blocks[index],
                            width,
                            row_shift,
                            i_height + row_shift,
                            column_shift,
                            bs,
                            out_block,
                            j_width,
                            0,
                            0,
                        );
                        copy_block_part(
                            &self.blocks[index + 1],
                            width2,
                            row_shift,
                            i_height + row_shift,
                            0,
                            width_excess,
                            out_block,
                            j_width,
                            0,
                            j_width - width_excess,
                        );
                    }
                    (false, false) => {
                        copy_block_part(
                            &self.blocks[index],
                            width,
                            row_shift,
                            i_height + row_shift,
                            column_shift,
                            j_width + column_shift,
                            out_block,
                            j_width,
                            0,
                            0,
                        );
                    }
                }
            }
        }

        Ok(out)
    }

    /// Extracts the rows and columns at the given indices, in the given
    /// order (repeats allowed).
    ///
    /// # Errors
    ///
    /// `NoData` for an empty index list, `OutOfRange` for a bad index.
    pub fn get_selected_sub_matrix(
        &self,
        selected_rows: &[usize],
        selected_columns: &[usize],
    ) -> Result<BlockMatrix<T>> {
        if selected_rows.is_empty() {
            return Err(MatrixError::NoData("no rows selected"));
        }
        if selected_columns.is_empty() {
            return Err(MatrixError::NoData("no columns selected"));
        }
        for &row in selected_rows {
            self.check_row_index(row)?;
        }
        for &column in selected_columns {
            self.check_column_index(column)?;
        }

        let mut out = BlockMatrix::zeros_with_block_size(
            selected_rows.len(),
            selected_columns.len(),
            self.block_size(),
        )?;
        let out_layout = out.layout;
        for i_block in 0..out_layout.block_rows() {
            for j_block in 0..out_layout.block_columns() {
                let out_block = &mut out.blocks[out_layout.block_index(i_block, j_block)];
                let mut k = 0;
                for &row in &selected_rows[out_layout.row_span(i_block)] {
                    for &column in &selected_columns[out_layout.column_span(j_block)] {
                        let (block, offset) = self.layout.locate(row, column);
                        out_block[k] = self.blocks[block][offset];
                        k += 1;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Copies the inclusive rectangle into `destination`, row-major, whose
    /// rows must be at least as long as the rectangle is wide.
    ///
    /// # Errors
    ///
    /// Range errors as in [`get_sub_matrix`](Self::get_sub_matrix);
    /// `MatrixDimensionMismatch` if `destination` is too small.
    pub fn copy_sub_matrix_into(
        &self,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
        destination: &mut [Vec<T>],
    ) -> Result<()> {
        self.check_sub_matrix_index(start_row, end_row, start_column, end_column)?;
        let rows = end_row - start_row + 1;
        let columns = end_column - start_column + 1;
        let dst_columns = destination.first().map_or(0, Vec::len);
        if destination.len() < rows || destination.iter().any(|row| row.len() < columns) {
            return Err(MatrixError::shape(rows, columns, destination.len(), dst_columns));
        }

        let layout = self.layout;
        let bs = self.block_size();
        for i_block in start_row / bs..=end_row / bs {
            let p_span = layout.row_span(i_block);
            let p_start = start_row.max(p_span.start);
            let p_end = (end_row + 1).min(p_span.end);
            for j_block in start_column / bs..=end_column / bs {
                let q_span = layout.column_span(j_block);
                let q_start = start_column.max(q_span.start);
                let q_end = (end_column + 1).min(q_span.end);
                let j_width = q_span.len();
                let block = &self.blocks[layout.block_index(i_block, j_block)];
                for p in p_start..p_end {
                    let src = (p - p_span.start) * j_width + (q_start - q_span.start);
                    let dst = q_start - start_column;
                    destination[p - start_row][dst..dst + q_end - q_start]
                        .copy_from_slice(&block[src..src + q_end - q_start]);
                }
            }
        }
        Ok(())
    }

    /// Overwrites the region starting at (`row`, `column`) with `sub_matrix`.
    ///
    /// The rectangle is scattered into every tile it overlaps, one slice
    /// copy per (row, tile) pair. All checks run before anything is written.
    ///
    /// # Errors
    ///
    /// `NoData` if `sub_matrix` has no rows or zero columns,
    /// `DimensionMismatch` if its rows differ in length, `OutOfRange` if it
    /// does not fit.
    pub fn set_sub_matrix<R: AsRef<[T]>>(
        &mut self,
        sub_matrix: &[R],
        row: usize,
        column: usize,
    ) -> Result<()> {
        let first = sub_matrix.first().ok_or(MatrixError::NoData("no rows"))?;
        let ref_length = first.as_ref().len();
        if ref_length == 0 {
            return Err(MatrixError::NoData("no columns"));
        }
        for (i, sub_row) in sub_matrix.iter().enumerate() {
            let len = sub_row.as_ref().len();
            if len != ref_length {
                return Err(MatrixError::length(format!("row {i}"), ref_length, len));
            }
        }
        self.check_row_index(row)?;
        self.check_column_index(column)?;
        let end_row = row + sub_matrix.len() - 1;
        let end_column = column + ref_length - 1;
        self.check_sub_matrix_index(row, end_row, column, end_column)?;

        let layout = self.layout;
        let bs = self.block_size();
        for i_block in row / bs..=end_row / bs {
            let p_span = layout.row_span(i_block);
            let i_start = row.max(p_span.start);
            let i_end = (end_row + 1).min(p_span.end);

            for j_block in column / bs..=end_column / bs {
                let q_span = layout.column_span(j_block);
                let j_width = q_span.len();
                let j_start = column.max(q_span.start);
                let j_end = (end_column + 1).min(q_span.end);
                let j_length = j_end - j_start;

                let block = &mut self.blocks[layout.block_index(i_block, j_block)];
                for i in i_start..i_end {
                    let dst = (i - p_span.start) * j_width + (j_start - q_span.start);
                    let src = j_start - column;
                    block[dst..dst + j_length]
                        .copy_from_slice(&sub_matrix[i - row].as_ref()[src..src + j_length]);
                }
            }
        }
        Ok(())
    }

    /// Row `row` as a vector.
    pub fn get_row(&self, row: usize) -> Result<Vec<T>> {
        self.check_row_index(row)?;
        let layout = self.layout;
        let i_block = row / self.block_size();
        let i_row = row - i_block * self.block_size();

        let mut out = Vec::with_capacity(self.columns());
        for j_block in 0..layout.block_columns() {
            let j_width = layout.block_width(j_block);
            let block = &self.blocks[layout.block_index(i_block, j_block)];
            out.extend_from_slice(&block[i_row * j_width..(i_row + 1) * j_width]);
        }
        Ok(out)
    }

    /// Overwrites row `row` with `values`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad row, `DimensionMismatch` unless
    /// `values.len() == self.columns()`.
    pub fn set_row(&mut self, row: usize, values: &[T]) -> Result<()> {
        self.check_row_index(row)?;
        if values.len() != self.columns() {
            return Err(MatrixError::length("row", self.columns(), values.len()));
        }
        let layout = self.layout;
        let i_block = row / self.block_size();
        let i_row = row - i_block * self.block_size();

        for j_block in 0..layout.block_columns() {
            let q_span = layout.column_span(j_block);
            let j_width = q_span.len();
            let block = &mut self.blocks[layout.block_index(i_block, j_block)];
            block[i_row * j_width..(i_row + 1) * j_width].copy_from_slice(&values[q_span]);
        }
        Ok(())
    }

    /// Column `column` as a vector.
    pub fn get_column(&self, column: usize) -> Result<Vec<T>> {
        self.check_column_index(column)?;
        let layout = self.layout;
        let j_block = column / self.block_size();
        let j_column = column - j_block * self.block_size();
        let j_width = layout.block_width(j_block);

        let mut out = Vec::with_capacity(self.rows());
        for i_block in 0..layout.block_rows() {
            let block = &self.blocks[layout.block_index(i_block, j_block)];
            for i in 0..layout.block_height(i_block) {
                out.push(block[i * j_width + j_column]);
            }
        }
        Ok(out)
    }

    /// Overwrites column `column` with `values`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad column, `DimensionMismatch` unless
    /// `values.len() == self.rows()`.
    pub fn set_column(&mut self, column: usize, values: &[T]) -> Result<()> {
        self.check_column_index(column)?;
        if values.len() != self.rows() {
            return Err(MatrixError::length("column", self.rows(), values.len()));
        }
        let layout = self.layout;
        let j_block = column / self.block_size();
        let j_column = column - j_block * self.block_size();
        let j_width = layout.block_width(j_block);

        for i_block in 0..layout.block_rows() {
            let p_span = layout.row_span(i_block);
            let block = &mut self.blocks[layout.block_index(i_block, j_block)];
            for (i, &value) in values[p_span].iter().enumerate() {
                block[i * j_width + j_column] = value;
            }
        }
        Ok(())
    }

    /// Row `row` as a `1 × columns` matrix with the same block size.
    ///
    /// Its column tiling matches `self`, so each source tile row maps onto
    /// exactly one output tile.
    pub fn get_row_matrix(&self, row: usize) -> Result<BlockMatrix<T>> {
        self.check_row_index(row)?;
        let mut out = BlockMatrix::zeros_with_block_size(1, self.columns(), self.block_size())?;
        let layout = self.layout;
        let i_block = row / self.block_size();
        let i_row = row - i_block * self.block_size();

        for (j_block, out_block) in out.blocks.iter_mut().enumerate() {
            let j_width = layout.block_width(j_block);
            let block = &self.blocks[layout.block_index(i_block, j_block)];
            out_block.copy_from_slice(&block[i_row * j_width..(i_row + 1) * j_width]);
        }
        Ok(out)
    }

    /// Overwrites row `row` with a `1 × columns` matrix.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad row, `MatrixDimensionMismatch` unless `matrix`
    /// is `1 × self.columns()`.
    pub fn set_row_matrix<M>(&mut self, row: usize, matrix: &M) -> Result<()>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        self.check_row_index(row)?;
        if matrix.rows() != 1 || matrix.columns() != self.columns() {
            return Err(MatrixError::shape(1, self.columns(), matrix.rows(), matrix.columns()));
        }
        let layout = self.layout;
        let i_block = row / self.block_size();
        let i_row = row - i_block * self.block_size();

        match self.compatible(matrix) {
            Some(m) => {
                for j_block in 0..layout.block_columns() {
                    let j_width = layout.block_width(j_block);
                    let block = &mut self.blocks[layout.block_index(i_block, j_block)];
                    block[i_row * j_width..(i_row + 1) * j_width]
                        .copy_from_slice(&m.blocks[j_block]);
                }
            }
            None => {
                debug!(row, "row matrix not block-compatible, copying entries");
                for column in 0..self.columns() {
                    let (block, offset) = layout.locate(row, column);
                    self.blocks[block][offset] = matrix.entry(0, column);
                }
            }
        }
        Ok(())
    }

    /// Column `column` as a `rows × 1` matrix with the same block size.
    pub fn get_column_matrix(&self, column: usize) -> Result<BlockMatrix<T>> {
        self.check_column_index(column)?;
        let mut out = BlockMatrix::zeros_with_block_size(self.rows(), 1, self.block_size())?;
        let layout = self.layout;
        let j_block = column / self.block_size();
        let j_column = column - j_block * self.block_size();
        let j_width = layout.block_width(j_block);

        for (i_block, out_block) in out.blocks.iter_mut().enumerate() {
            let block = &self.blocks[layout.block_index(i_block, j_block)];
            for (i, slot) in out_block.iter_mut().enumerate() {
                *slot = block[i * j_width + j_column];
            }
        }
        Ok(out)
    }

    /// Overwrites column `column` with a `rows × 1` matrix.
    ///
    /// # Errors
    ///
    /// `OutOfRange` for a bad column, `MatrixDimensionMismatch` unless
    /// `matrix` is `self.rows() × 1`.
    pub fn set_column_matrix<M>(&mut self, column: usize, matrix: &M) -> Result<()>
    where
        M: MatrixAccess<T> + ?Sized,
    {
        self.check_column_index(column)?;
        if matrix.rows() != self.rows() || matrix.columns() != 1 {
            return Err(MatrixError::shape(self.rows(), 1, matrix.rows(), matrix.columns()));
        }
        let layout = self.layout;
        let j_block = column / self.block_size();
        let j_column = column - j_block * self.block_size();
        let j_width = layout.block_width(j_block);

        match self.compatible(matrix) {
            Some(m) => {
                for i_block in 0..layout.block_rows() {
                    let block = &mut self.blocks[layout.block_index(i_block, j_block)];
                    for (i, &value) in m.blocks[i_block].iter().enumerate() {
                        block[i * j_width + j_column] = value;
                    }
                }
            }
            None => {
                debug!(column, "column matrix not block-compatible");
                for row in 0..self.rows() {
                    let (block, offset) = layout.locate(row, column);
                    self.blocks[block][offset] = matrix.entry(row, 0);
                }
            }
        }
        Ok(())
    }
}
