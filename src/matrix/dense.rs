//! Row-major dense matrix.

use crate::error::{MatrixError, Result};
use crate::field::FieldElement;
use crate::matrix::MatrixAccess;
use crate::matrix::naive_ijk::matmul_naive_ijk;
use crate::matrix::transpose::transpose;

/// A matrix stored as one row-major buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix<T> {
    rows: usize,
    columns: usize,
    data: Vec<T>,
}

impl<T: FieldElement> DenseMatrix<T> {
    /// Zero-filled `rows × columns` matrix.
    pub fn zeros(rows: usize, columns: usize) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(MatrixError::NotStrictlyPositive { rows, columns });
        }
        Ok(Self {
            rows,
            columns,
            data: vec![T::zero(); rows * columns],
        })
    }

    /// Wraps an existing row-major buffer.
    pub fn from_vec(rows: usize, columns: usize, data: Vec<T>) -> Result<Self> {
        if rows == 0 || columns == 0 {
            return Err(MatrixError::NotStrictlyPositive { rows, columns });
        }
        if data.len() != rows * columns {
            return Err(MatrixError::length("dense matrix data", rows * columns, data.len()));
        }
        Ok(Self {
            rows,
            columns,
            data,
        })
    }

    /// Copies a rectangular array of rows.
    pub fn from_rows<R: AsRef<[T]>>(raw: &[R]) -> Result<Self> {
        let first = raw.first().ok_or(MatrixError::NoData("no rows"))?;
        let columns = first.as_ref().len();
        if columns == 0 {
            return Err(MatrixError::NoData("no columns"));
        }
        let mut data = Vec::with_capacity(raw.len() * columns);
        for (i, row) in raw.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != columns {
                return Err(MatrixError::length(format!("row {i}"), columns, row.len()));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: raw.len(),
            columns,
            data,
        })
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn set(&mut self, row: usize, column: usize, value: T) {
        self.data[row * self.columns + column] = value;
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.columns).map(<[T]>::to_vec).collect()
    }

    /// Reference product through the naive i-j-k loop.
    pub fn multiply(&self, other: &DenseMatrix<T>) -> Result<DenseMatrix<T>> {
        if self.columns != other.rows {
            return Err(MatrixError::shape(self.columns, other.columns, other.rows, other.columns));
        }
        let mut out = DenseMatrix::zeros(self.rows, other.columns)?;
        matmul_naive_ijk(
            &self.data,
            &other.data,
            &mut out.data,
            self.rows,
            other.columns,
            self.columns,
        );
        Ok(out)
    }

    pub fn transpose(&self) -> DenseMatrix<T> {
        let mut data = vec![T::zero(); self.data.len()];
        transpose(&self.data, &mut data, self.rows, self.columns);
        DenseMatrix {
            rows: self.columns,
            columns: self.rows,
            data,
        }
    }
}

impl<T: FieldElement> MatrixAccess<T> for DenseMatrix<T> {
    fn rows(&self) -> usize {
        self.rows
    }

    fn columns(&self) -> usize {
        self.columns
    }

    fn entry(&self, row: usize, column: usize) -> T {
        self.data[row * self.columns + column]
    }
}
