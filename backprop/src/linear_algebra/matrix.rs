use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

use serde::{Deserialize, Serialize};

use crate::error::BackpropError;

use super::{Value, ValueType};

/// The `[rows, columns]` of a matrix.
pub type Shape = [usize; 2];

/// A dense, row-major matrix whose dimensions are only known at runtime.
#[derive(Clone, Deserialize, PartialEq, Serialize)]
pub struct Matrix {
    values: Vec<Value>,
    dim: Shape,
}

impl Matrix {
    pub fn zeros(rows: usize, columns: usize) -> Self {
        Self {
            values: vec![Value::ZERO; rows * columns],
            dim: [rows, columns],
        }
    }

    pub fn ones(rows: usize, columns: usize) -> Self {
        Self {
            values: vec![Value::ONE; rows * columns],
            dim: [rows, columns],
        }
    }

    /// Wraps row-major `values` in a matrix of shape `dim`.
    pub fn from_vec(values: Vec<Value>, dim: Shape) -> Result<Self, BackpropError> {
        let expected = dim[0] * dim[1];
        if values.len() != expected {
            return Err(BackpropError::ParameterCount {
                expected,
                found: values.len(),
            });
        }

        Ok(Self { values, dim })
    }

    pub fn from_rows(rows: &[Vec<Value>]) -> Result<Self, BackpropError> {
        let columns = rows.first().map_or(0, Vec::len);

        let mut values = Vec::with_capacity(rows.len() * columns);
        for row in rows {
            if row.len() != columns {
                return Err(BackpropError::DimensionMismatch {
                    operation: "from_rows",
                    left: [1, columns],
                    right: [1, row.len()],
                });
            }
            values.extend_from_slice(row);
        }

        Ok(Self {
            values,
            dim: [rows.len(), columns],
        })
    }

    pub fn shape(&self) -> Shape {
        self.dim
    }

    pub fn rows(&self) -> usize {
        self.dim[0]
    }

    pub fn columns(&self) -> usize {
        self.dim[1]
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [Value] {
        &mut self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &[Value]> {
        let columns = self.dim[1];
        (0..self.dim[0]).map(move |i| &self.values[i * columns..(i + 1) * columns])
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut [Value]> {
        self.values.chunks_exact_mut(self.dim[1].max(1))
    }

    pub fn map(&self, f: impl Fn(Value) -> Value) -> Self {
        Self {
            values: self.values.iter().map(|&x| f(x)).collect(),
            dim: self.dim,
        }
    }

    pub fn transpose(&self) -> Self {
        let [rows, columns] = self.dim;
        let mut result = Self::zeros(columns, rows);
        for row in 0..rows {
            for column in 0..columns {
                result.values[column * rows + row] = self.values[row * columns + column];
            }
        }
        result
    }

    /// The matrix product `self · rhs`.
    pub fn dot(&self, rhs: &Matrix) -> Result<Self, BackpropError> {
        if self.dim[1] != rhs.dim[0] {
            return Err(self.mismatch("dot", rhs));
        }

        let [rows, inner] = self.dim;
        let columns = rhs.dim[1];

        let mut result = Self::zeros(rows, columns);
        for row in 0..rows {
            let output = &mut result.values[row * columns..(row + 1) * columns];
            for k in 0..inner {
                let a = self.values[row * inner + k];
                output
                    .iter_mut()
                    .zip(&rhs.values[k * columns..(k + 1) * columns])
                    .for_each(|(o, b)| *o += a * b);
            }
        }
        Ok(result)
    }

    /// Adds a single-row matrix to every row.
    pub fn add_row(&self, row: &Matrix) -> Result<Self, BackpropError> {
        if row.dim[0] != 1 || row.dim[1] != self.dim[1] {
            return Err(self.mismatch("add_row", row));
        }

        let mut result = self.clone();
        result
            .iter_mut()
            .for_each(|r| r.iter_mut().zip(&row.values).for_each(|(x, b)| *x += b));
        Ok(result)
    }

    pub fn add_matrix(&self, rhs: &Matrix) -> Result<Self, BackpropError> {
        self.zip_with("add_matrix", rhs, |a, b| a + b)
    }

    pub fn sub_matrix(&self, rhs: &Matrix) -> Result<Self, BackpropError> {
        self.zip_with("sub_matrix", rhs, |a, b| a - b)
    }

    /// The elementwise product.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Self, BackpropError> {
        self.zip_with("hadamard", rhs, |a, b| a * b)
    }

    /// Sums over the rows, giving a single-row matrix.
    pub fn column_sum(&self) -> Self {
        let mut result = Self::zeros(1, self.dim[1]);
        for row in self.iter() {
            result
                .values
                .iter_mut()
                .zip(row)
                .for_each(|(sum, x)| *sum += x);
        }
        result
    }

    pub fn row_sums(&self) -> Vec<Value> {
        self.iter().map(|row| row.iter().sum()).collect()
    }

    fn zip_with(
        &self,
        operation: &'static str,
        rhs: &Matrix,
        f: impl Fn(Value, Value) -> Value,
    ) -> Result<Self, BackpropError> {
        if self.dim != rhs.dim {
            return Err(self.mismatch(operation, rhs));
        }

        Ok(Self {
            values: self
                .values
                .iter()
                .zip(&rhs.values)
                .map(|(&a, &b)| f(a, b))
                .collect(),
            dim: self.dim,
        })
    }

    fn mismatch(&self, operation: &'static str, rhs: &Matrix) -> BackpropError {
        BackpropError::DimensionMismatch {
            operation,
            left: self.dim,
            right: rhs.dim,
        }
    }
}

macro_rules! value_op_impl {
    ($op:ident, $op_method:ident, $op_assign:ident, $op_assign_method:ident) => {
        impl $op<Value> for Matrix {
            type Output = Matrix;

            fn $op_method(mut self, rhs: Value) -> Self::Output {
                self.$op_assign_method(rhs);
                self
            }
        }

        impl $op<Value> for &Matrix {
            type Output = Matrix;

            fn $op_method(self, rhs: Value) -> Self::Output {
                self.clone().$op_method(rhs)
            }
        }

        impl $op_assign<Value> for Matrix {
            fn $op_assign_method(&mut self, rhs: Value) {
                for x in self.values.iter_mut() {
                    (*x).$op_assign_method(rhs)
                }
            }
        }
    };
}

value_op_impl!(Add, add, AddAssign, add_assign);
value_op_impl!(Sub, sub, SubAssign, sub_assign);
value_op_impl!(Mul, mul, MulAssign, mul_assign);
value_op_impl!(Div, div, DivAssign, div_assign);

impl Neg for Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Neg for &Matrix {
    type Output = Matrix;

    fn neg(self) -> Self::Output {
        self * -Value::ONE
    }
}

impl Index<usize> for Matrix {
    type Output = [Value];

    fn index(&self, row: usize) -> &Self::Output {
        let columns = self.dim[1];
        &self.values[row * columns..(row + 1) * columns]
    }
}

impl IndexMut<usize> for Matrix {
    fn index_mut(&mut self, row: usize) -> &mut Self::Output {
        let columns = self.dim[1];
        &mut self.values[row * columns..(row + 1) * columns]
    }
}

impl<const R: usize, const C: usize> From<[[Value; C]; R]> for Matrix {
    fn from(values: [[Value; C]; R]) -> Self {
        Self {
            values: values.iter().flatten().copied().collect(),
            dim: [R, C],
        }
    }
}

impl fmt::Debug for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [rows, columns] = self.dim;
        if rows == 0 {
            return write!(f, "[]");
        }

        for row in 0..rows {
            write!(f, "{}", if row == 0 { "[" } else { " " })?;
            for column in 0..columns {
                self[row][column].fmt(f)?;
                if column < columns - 1 {
                    write!(f, " ")?;
                }
            }
            write!(f, "{}", if row < rows - 1 { "\n" } else { "]" })?;
        }
        Ok(())
    }
}
