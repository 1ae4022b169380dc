//! Conversion between a list of parameter matrices and one flat vector.
//!
//! Optimizers only see the flat vector. The [`Manifest`] records the shape of each matrix so
//! the vector can be sliced back apart in the same order it was concatenated.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::BackpropError;
use crate::linear_algebra::{Matrix, Shape, Value};

/// The ordered shapes of the matrices packed into a flat parameter vector.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Manifest(Vec<Shape>);

impl Manifest {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self(shapes)
    }

    /// The number of values the manifest describes in total.
    pub fn parameter_count(&self) -> usize {
        self.iter().map(|[rows, columns]| rows * columns).sum()
    }
}

impl Deref for Manifest {
    type Target = [Shape];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Shape>> for Manifest {
    fn from(shapes: Vec<Shape>) -> Self {
        Self(shapes)
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, [rows, columns]) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{rows}x{columns}")?;
        }
        write!(f, "]")
    }
}

/// Concatenates the row-major values of `matrices` into one vector.
pub fn multi_flatten(matrices: &[Matrix]) -> (Vec<Value>, Manifest) {
    let mut parameters = Vec::with_capacity(matrices.iter().map(|m| m.values().len()).sum());
    let mut shapes = Vec::with_capacity(matrices.len());

    for matrix in matrices {
        parameters.extend_from_slice(matrix.values());
        shapes.push(matrix.shape());
    }

    (parameters, Manifest(shapes))
}

/// Slices `parameters` back into matrices with the shapes listed in `manifest`.
pub fn multi_unflatten(
    parameters: &[Value],
    manifest: &Manifest,
) -> Result<Vec<Matrix>, BackpropError> {
    let expected = manifest.parameter_count();
    if parameters.len() != expected {
        return Err(BackpropError::ParameterCount {
            expected,
            found: parameters.len(),
        });
    }

    let mut offset = 0;
    manifest
        .iter()
        .map(|&shape| {
            let len = shape[0] * shape[1];
            let values = parameters[offset..offset + len].to_vec();
            offset += len;
            Matrix::from_vec(values, shape)
        })
        .collect()
}
