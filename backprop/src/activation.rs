use crate::linear_algebra::{Matrix, Value};

pub fn logistic(x: Value) -> Value {
    1.0 / (1.0 + (-x).exp())
}

/// The derivative of the logistic function, given its output `a = logistic(x)`.
pub fn logistic_prime_from_output(a: Value) -> Value {
    a * (1.0 - a)
}

pub fn identity(x: Value) -> Value {
    x
}

pub fn identity_prime_from_output(_a: Value) -> Value {
    1.0
}

/// Exponentiates each row and normalizes it to sum to one.
///
/// The row maximum is subtracted first. This leaves the result unchanged and keeps `exp` from
/// overflowing on large logits.
pub fn softmax(inputs: &Matrix) -> Matrix {
    let mut outputs = inputs.clone();
    for row in outputs.iter_mut() {
        let max = row.iter().copied().fold(Value::NEG_INFINITY, Value::max);
        row.iter_mut().for_each(|x| *x = (*x - max).exp());

        let sum = row.iter().sum::<Value>();
        row.iter_mut().for_each(|x| *x /= sum);
    }
    outputs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_values() {
        assert_eq!(logistic(0.0), 0.5);
        assert!((logistic(2.0) - 0.880797077977882).abs() < 1e-12);
        assert!((logistic(-2.0) + logistic(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn logistic_prime_matches_finite_difference() {
        let epsilon = 1e-6;
        for &x in &[-3.0, -0.5, 0.0, 0.7, 4.0] {
            let numeric = (logistic(x + epsilon) - logistic(x - epsilon)) / (2.0 * epsilon);
            let analytic = logistic_prime_from_output(logistic(x));
            assert!((numeric - analytic).abs() < 1e-8, "x = {x}");
        }
    }

    #[test]
    fn softmax_rows_sum_to_one() {
        let inputs = Matrix::from([[1.0, 0.0, -1.0], [500.0, 499.0, -300.0], [0.0, 0.0, 0.0]]);
        let outputs = softmax(&inputs);

        for sum in outputs.row_sums() {
            assert!((sum - 1.0).abs() < 1e-12);
        }
        assert!(outputs.values().iter().all(|p| p.is_finite() && *p >= 0.0));
        assert!((outputs[2][0] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn softmax_two_classes() {
        let outputs = softmax(&Matrix::from([[1.0, 0.0]]));
        let e = std::f64::consts::E;
        assert!((outputs[0][0] - e / (e + 1.0)).abs() < 1e-12);
        assert!((outputs[0][1] - 1.0 / (e + 1.0)).abs() < 1e-12);
    }
}
