//! Visitor-driven traversal.
//!
//! Three orders are offered:
//! - row order: row 0 left to right, then row 1, ... (externally observable)
//! - column order: column 0 top to bottom, then column 1, ...
//! - optimized order: one tile at a time, in grid order; each tile is
//!   brought into cache once, but rows interleave across tiles
//!
//! Every walk has a bounded variant over an inclusive rectangle; the
//! rectangle is intersected with each tile it touches.

use std::ops::Range;

use crate::blocked::BlockMatrix;
use crate::blocked::layout::BlockLayout;
use crate::error::Result;
use crate::field::FieldElement;

/// Visitor that may replace every entry it sees.
pub trait ChangingVisitor<T> {
    /// Called once before the first visit with the matrix shape and the
    /// inclusive rectangle about to be walked.
    #[allow(unused_variables)]
    fn start(
        &mut self,
        rows: usize,
        columns: usize,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) {
    }

    /// Returns the new value of entry (`row`, `column`).
    fn visit(&mut self, row: usize, column: usize, value: T) -> T;

    /// Called once after the last visit; its result is the walk's result.
    fn end(&mut self) -> T;
}

/// Visitor that only reads entries.
pub trait PreservingVisitor<T> {
    /// Called once before the first visit with the matrix shape and the
    /// inclusive rectangle about to be walked.
    #[allow(unused_variables)]
    fn start(
        &mut self,
        rows: usize,
        columns: usize,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) {
    }

    fn visit(&mut self, row: usize, column: usize, value: T);

    /// Called once after the last visit; its result is the walk's result.
    fn end(&mut self) -> T;
}

/// Order in which cells are handed to a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Row,
    Column,
    Tiles,
}

/// Inclusive rectangle to walk.
#[derive(Debug, Clone, Copy)]
struct Region {
    start_row: usize,
    end_row: usize,
    start_column: usize,
    end_column: usize,
}

impl Region {
    fn whole(layout: &BlockLayout) -> Self {
        Self {
            start_row: 0,
            end_row: layout.rows() - 1,
            start_column: 0,
            end_column: layout.columns() - 1,
        }
    }

    fn block_rows(&self, bs: usize) -> Range<usize> {
        self.start_row / bs..self.end_row / bs + 1
    }

    fn block_columns(&self, bs: usize) -> Range<usize> {
        self.start_column / bs..self.end_column / bs + 1
    }

    /// Rows of block row `i_block` inside the region.
    fn rows_in(&self, layout: &BlockLayout, i_block: usize) -> Range<usize> {
        let span = layout.row_span(i_block);
        self.start_row.max(span.start)..(self.end_row + 1).min(span.end)
    }

    /// Columns of block column `j_block` inside the region.
    fn columns_in(&self, layout: &BlockLayout, j_block: usize) -> Range<usize> {
        let span = layout.column_span(j_block);
        self.start_column.max(span.start)..(self.end_column + 1).min(span.end)
    }

    /// Calls `f(block, offset, row, column)` for every cell in `order`.
    fn for_each_cell<F>(&self, layout: &BlockLayout, order: Order, mut f: F)
    where
        F: FnMut(usize, usize, usize, usize),
    {
        let bs = layout.block_size();
        match order {
            Order::Row => {
                for i_block in self.block_rows(bs) {
                    for p in self.rows_in(layout, i_block) {
                        // A logical row is split over the tiles of this block row.
                        for j_block in self.block_columns(bs) {
                            self.tile_row(layout, (i_block, j_block), p, &mut f);
                        }
                    }
                }
            }
            Order::Column => {
                for j_block in self.block_columns(bs) {
                    let j_width = layout.block_width(j_block);
                    let q0 = j_block * bs;
                    for q in self.columns_in(layout, j_block) {
                        for i_block in self.block_rows(bs) {
                            let index = layout.block_index(i_block, j_block);
                            let p0 = i_block * bs;
                            for p in self.rows_in(layout, i_block) {
                                f(index, (p - p0) * j_width + q - q0, p, q);
                            }
                        }
                    }
                }
            }
            Order::Tiles => {
                for i_block in self.block_rows(bs) {
                    for j_block in self.block_columns(bs) {
                        for p in self.rows_in(layout, i_block) {
                            self.tile_row(layout, (i_block, j_block), p, &mut f);
                        }
                    }
                }
            }
        }
    }

    /// The cells of row `p` that lie in one tile, left to right.
    fn tile_row<F>(&self, layout: &BlockLayout, tile: (usize, usize), p: usize, f: &mut F)
    where
        F: FnMut(usize, usize, usize, usize),
    {
        let (i_block, j_block) = tile;
        let bs = layout.block_size();
        let index = layout.block_index(i_block, j_block);
        let columns = self.columns_in(layout, j_block);
        let row_start = (p - i_block * bs) * layout.block_width(j_block);
        let mut k = row_start + columns.start - j_block * bs;
        for q in columns {
            f(index, k, p, q);
            k += 1;
        }
    }
}

impl<T: FieldElement> BlockMatrix<T> {
    /// Visits every entry in row order, storing what the visitor returns.
    pub fn walk_in_row_order_mut<V: ChangingVisitor<T>>(&mut self, visitor: &mut V) -> T {
        let region = Region::whole(&self.layout);
        self.walk_mut(visitor, region, Order::Row)
    }

    /// Visits rows `start_row..=end_row`, columns `start_column..=end_column`
    /// in row order, storing what the visitor returns.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle; the visitor is not
    /// started in that case.
    pub fn walk_in_row_order_range_mut<V: ChangingVisitor<T>>(
        &mut self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk_mut(visitor, region, Order::Row))
    }

    /// Visits every entry in row order.
    ///
    /// ```
    /// use blockmat::{BlockMatrix, PreservingVisitor};
    ///
    /// struct Sum(f64);
    ///
    /// impl PreservingVisitor<f64> for Sum {
    ///     fn visit(&mut self, _row: usize, _column: usize, value: f64) {
    ///         self.0 += value;
    ///     }
    ///
    ///     fn end(&mut self) -> f64 {
    ///         self.0
    ///     }
    /// }
    ///
    /// let m = BlockMatrix::from_rows_with_block_size(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], 2)
    ///     .unwrap();
    /// assert_eq!(m.walk_in_row_order(&mut Sum(0.0)), 21.0);
    /// ```
    pub fn walk_in_row_order<V: PreservingVisitor<T>>(&self, visitor: &mut V) -> T {
        self.walk(visitor, Region::whole(&self.layout), Order::Row)
    }

    /// Visits an inclusive rectangle in row order.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle.
    pub fn walk_in_row_order_range<V: PreservingVisitor<T>>(
        &self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk(visitor, region, Order::Row))
    }

    /// Visits every entry in column order, storing what the visitor returns.
    pub fn walk_in_column_order_mut<V: ChangingVisitor<T>>(&mut self, visitor: &mut V) -> T {
        let region = Region::whole(&self.layout);
        self.walk_mut(visitor, region, Order::Column)
    }

    /// Visits an inclusive rectangle in column order, storing what the
    /// visitor returns.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle.
    pub fn walk_in_column_order_range_mut<V: ChangingVisitor<T>>(
        &mut self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk_mut(visitor, region, Order::Column))
    }

    /// Visits every entry in column order.
    pub fn walk_in_column_order<V: PreservingVisitor<T>>(&self, visitor: &mut V) -> T {
        self.walk(visitor, Region::whole(&self.layout), Order::Column)
    }

    /// Visits an inclusive rectangle in column order.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle.
    pub fn walk_in_column_order_range<V: PreservingVisitor<T>>(
        &self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk(visitor, region, Order::Column))
    }

    /// Visits every entry tile by tile, storing what the visitor returns.
    /// No row ordering is guaranteed.
    pub fn walk_in_optimized_order_mut<V: ChangingVisitor<T>>(&mut self, visitor: &mut V) -> T {
        let region = Region::whole(&self.layout);
        self.walk_mut(visitor, region, Order::Tiles)
    }

    /// Visits an inclusive rectangle tile by tile, storing what the visitor
    /// returns.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle.
    pub fn walk_in_optimized_order_range_mut<V: ChangingVisitor<T>>(
        &mut self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk_mut(visitor, region, Order::Tiles))
    }

    /// Visits every entry tile by tile. No row ordering is guaranteed.
    pub fn walk_in_optimized_order<V: PreservingVisitor<T>>(&self, visitor: &mut V) -> T {
        self.walk(visitor, Region::whole(&self.layout), Order::Tiles)
    }

    /// Visits an inclusive rectangle tile by tile.
    ///
    /// # Errors
    ///
    /// `OutOfRange` or `InvalidRange` for a bad rectangle.
    pub fn walk_in_optimized_order_range<V: PreservingVisitor<T>>(
        &self,
        visitor: &mut V,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<T> {
        let region = self.region(start_row, end_row, start_column, end_column)?;
        Ok(self.walk(visitor, region, Order::Tiles))
    }

    fn region(
        &self,
        start_row: usize,
        end_row: usize,
        start_column: usize,
        end_column: usize,
    ) -> Result<Region> {
        self.check_sub_matrix_index(start_row, end_row, start_column, end_column)?;
        Ok(Region {
            start_row,
            end_row,
            start_column,
            end_column,
        })
    }

    fn walk_mut<V>(&mut self, visitor: &mut V, region: Region, order: Order) -> T
    where
        V: ChangingVisitor<T>,
    {
        let layout = self.layout;
        visitor.start(
            layout.rows(),
            layout.columns(),
            region.start_row,
            region.end_row,
            region.start_column,
            region.end_column,
        );
        let blocks = &mut self.blocks;
        region.for_each_cell(&layout, order, |block, offset, row, column| {
            let slot = &mut blocks[block][offset];
            *slot = visitor.visit(row, column, *slot);
        });
        visitor.end()
    }

    fn walk<V>(&self, visitor: &mut V, region: Region, order: Order) -> T
    where
        V: PreservingVisitor<T>,
    {
        let layout = self.layout;
        visitor.start(
            layout.rows(),
            layout.columns(),
            region.start_row,
            region.end_row,
            region.start_column,
            region.end_column,
        );
        region.for_each_cell(&layout, order, |block, offset, row, column| {
            visitor.visit(row, column, self.blocks[block][offset]);
        });
        visitor.end()
    }
}
