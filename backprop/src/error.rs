use std::error::Error;
use std::fmt;

use crate::flatten::Manifest;
use crate::linear_algebra::Shape;

/// Everything that can go wrong while evaluating the cost and gradient.
///
/// None of these are expected at runtime; each one means the caller handed over arrays that
/// don't fit together, and the computation stops where the problem was found.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackpropError {
    /// Two operands of a matrix operation have incompatible shapes.
    DimensionMismatch {
        operation: &'static str,
        left: Shape,
        right: Shape,
    },
    /// The manifest recovered from flattening the gradients differs from the one given for
    /// the parameters.
    InternalConsistency { expected: Manifest, found: Manifest },
    /// A flat vector doesn't hold exactly as many values as its shapes call for.
    ParameterCount { expected: usize, found: usize },
    /// A manifest holds the wrong number of parameter groups for the network.
    GroupCount { expected: usize, found: usize },
    InvalidArchitecture(&'static str),
}

impl fmt::Display for BackpropError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "dimension mismatch in {operation}: {}x{} and {}x{}",
                left[0], left[1], right[0], right[1],
            ),
            Self::InternalConsistency { expected, found } => write!(
                f,
                "gradient manifest {found} does not match parameter manifest {expected}",
            ),
            Self::ParameterCount { expected, found } => {
                write!(f, "expected {expected} parameters, found {found}")
            }
            Self::GroupCount { expected, found } => {
                write!(f, "expected {expected} parameter groups, found {found}")
            }
            Self::InvalidArchitecture(reason) => write!(f, "invalid architecture: {reason}"),
        }
    }
}

impl Error for BackpropError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_dimension_mismatch() {
        let error = BackpropError::DimensionMismatch {
            operation: "dot",
            left: [2, 3],
            right: [4, 5],
        };
        assert_eq!(error.to_string(), "dimension mismatch in dot: 2x3 and 4x5");
    }

    #[test]
    fn display_internal_consistency() {
        let error = BackpropError::InternalConsistency {
            expected: Manifest::new(vec![[2, 2], [1, 2]]),
            found: Manifest::new(vec![[2, 2]]),
        };
        assert_eq!(
            error.to_string(),
            "gradient manifest [2x2] does not match parameter manifest [2x2, 1x2]"
        );
    }
}
