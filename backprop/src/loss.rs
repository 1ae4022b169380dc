use crate::error::BackpropError;
use crate::linear_algebra::{Matrix, Value};

/// Calculates the multi-class cross-entropy, summed over the whole batch.
///
/// Targets are expected to be probability distributions (one-hot in practice). Nothing is
/// clamped, so a zero probability on a target class gives an infinite cost.
pub fn cross_entropy(probabilities: &Matrix, targets: &Matrix) -> Result<Value, BackpropError> {
    let terms = targets.hadamard(&probabilities.map(Value::ln))?;
    Ok(-terms.values().iter().sum::<Value>())
}

/// Calculates the derivative of the cross-entropy with respect to the logits of a softmax
/// output layer.
pub fn cross_entropy_prime(
    probabilities: &Matrix,
    targets: &Matrix,
) -> Result<Matrix, BackpropError> {
    probabilities.sub_matrix(targets)
}

/// Counts the samples whose most probable class isn't the target class.
pub fn classification_errors(
    probabilities: &Matrix,
    targets: &Matrix,
) -> Result<usize, BackpropError> {
    if probabilities.shape() != targets.shape() {
        return Err(BackpropError::DimensionMismatch {
            operation: "classification_errors",
            left: probabilities.shape(),
            right: targets.shape(),
        });
    }

    Ok(probabilities
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| argmax(p) != argmax(t))
        .count())
}

fn argmax(row: &[Value]) -> Option<usize> {
    row.iter()
        .enumerate()
        .fold(None, |best: Option<(usize, Value)>, (i, &x)| match best {
            Some((_, max)) if max >= x => best,
            _ => Some((i, x)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_entropy_one_hot() {
        let probabilities = Matrix::from([[0.7, 0.2, 0.1], [0.25, 0.25, 0.5]]);
        let targets = Matrix::from([[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);

        let cost = cross_entropy(&probabilities, &targets).unwrap();
        let expected = -(0.7f64.ln() + 0.5f64.ln());
        assert!((cost - expected).abs() < 1e-12);
        assert!(cost >= 0.0);
    }

    #[test]
    fn cross_entropy_shape_mismatch() {
        let probabilities = Matrix::from([[0.5, 0.5]]);
        let targets = Matrix::from([[1.0, 0.0, 0.0]]);
        assert!(cross_entropy(&probabilities, &targets).is_err());
        assert!(cross_entropy_prime(&probabilities, &targets).is_err());
    }

    #[test]
    fn cross_entropy_prime_is_difference() {
        let probabilities = Matrix::from([[0.7, 0.3]]);
        let targets = Matrix::from([[1.0, 0.0]]);
        let delta = cross_entropy_prime(&probabilities, &targets).unwrap();
        assert!((delta[0][0] + 0.3).abs() < 1e-12);
        assert!((delta[0][1] - 0.3).abs() < 1e-12);
    }

    #[test]
    fn counts_misclassified_rows() {
        let probabilities = Matrix::from([[0.7, 0.2, 0.1], [0.4, 0.5, 0.1], [0.1, 0.1, 0.8]]);
        let targets = Matrix::from([[1.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(classification_errors(&probabilities, &targets), Ok(1));
    }

    #[test]
    fn argmax_takes_first_of_ties() {
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[0.1, 0.3, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }
}
