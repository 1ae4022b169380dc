use crate::error::BackpropError;
use crate::linear_algebra::{Matrix, Value};

pub fn fully_connected_forward(
    inputs: &Matrix,
    weights: &Matrix,
    biases: &Matrix,
) -> Result<Matrix, BackpropError> {
    inputs.dot(weights)?.add_row(biases)
}

/// Returns the weight gradients, bias gradients and input gradients of a fully connected layer.
pub fn fully_connected_backward(
    inputs: &Matrix,
    output_gradients: &Matrix,
    weights: &Matrix,
) -> Result<(Matrix, Matrix, Matrix), BackpropError> {
    let weight_gradients = inputs.transpose().dot(output_gradients)?;

    let bias_gradients = output_gradients.column_sum();

    let input_gradients = output_gradients.dot(&weights.transpose())?;

    Ok((weight_gradients, bias_gradients, input_gradients))
}

pub fn activation_forward(inputs: &Matrix, activation: impl Fn(Value) -> Value) -> Matrix {
    inputs.map(activation)
}

/// Backpropagates through an activation whose derivative can be written in terms of its
/// output, as with the logistic function.
pub fn activation_backward_from_output(
    outputs: &Matrix,
    output_gradients: &Matrix,
    activation_prime: impl Fn(Value) -> Value,
) -> Result<Matrix, BackpropError> {
    outputs.map(activation_prime).hadamard(output_gradients)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::activation::{logistic, logistic_prime_from_output};

    fn check(expected: &Matrix, output: &Matrix) {
        assert_eq!(expected.shape(), output.shape());
        for (e, o) in expected.values().iter().zip(output.values()) {
            assert!(
                (e - o).abs() < 1e-9,
                "expected: {expected:?}\nreceived: {output:?}"
            );
        }
    }

    #[test]
    fn forward() {
        let inputs = Matrix::from([[1.0, 2.0, 3.0, 4.0]]);
        let weights = Matrix::from([
            [1.0, 5.0, 9.0],
            [2.0, 6.0, 10.0],
            [3.0, 7.0, 11.0],
            [4.0, 8.0, 12.0],
        ]);
        let biases = Matrix::from([[0.5, -0.5, 1.0]]);

        let outputs = fully_connected_forward(&inputs, &weights, &biases).unwrap();
        check(&Matrix::from([[30.5, 69.5, 111.0]]), &outputs);
    }

    #[test]
    fn forward_rejects_wrong_fan_in() {
        let inputs = Matrix::zeros(2, 3);
        let weights = Matrix::zeros(4, 2);
        let biases = Matrix::zeros(1, 2);

        assert_eq!(
            fully_connected_forward(&inputs, &weights, &biases),
            Err(BackpropError::DimensionMismatch {
                operation: "dot",
                left: [2, 3],
                right: [4, 2],
            })
        );
    }

    #[test]
    fn backward() {
        let inputs = Matrix::from([[1.0, 2.0, 3.0, 4.0]]);
        let weights = Matrix::from([
            [1.0, 5.0, 9.0],
            [2.0, 6.0, 10.0],
            [3.0, 7.0, 11.0],
            [4.0, 8.0, 12.0],
        ]);
        let output_gradients = Matrix::from([[0.2, 0.4, 0.6]]);

        let (weight_gradients, bias_gradients, input_gradients) =
            fully_connected_backward(&inputs, &output_gradients, &weights).unwrap();

        check(
            &Matrix::from([
                [0.2, 0.4, 0.6],
                [0.4, 0.8, 1.2],
                [0.6, 1.2, 1.8],
                [0.8, 1.6, 2.4],
            ]),
            &weight_gradients,
        );
        check(&Matrix::from([[0.2, 0.4, 0.6]]), &bias_gradients);
        check(&Matrix::from([[7.6, 8.8, 10.0, 11.2]]), &input_gradients);
    }

    #[test]
    fn backward_sums_bias_over_batch() {
        let inputs = Matrix::from([[1.0], [2.0]]);
        let weights = Matrix::from([[3.0, -1.0]]);
        let output_gradients = Matrix::from([[0.5, 1.0], [0.25, -2.0]]);

        let (weight_gradients, bias_gradients, input_gradients) =
            fully_connected_backward(&inputs, &output_gradients, &weights).unwrap();

        check(&Matrix::from([[1.0, -3.0]]), &weight_gradients);
        check(&Matrix::from([[0.75, -1.0]]), &bias_gradients);
        check(&Matrix::from([[0.5], [2.75]]), &input_gradients);
    }

    #[test]
    fn logistic_backward() {
        let outputs = activation_forward(&Matrix::from([[0.0, 2.0]]), logistic);
        let gradients = activation_backward_from_output(
            &outputs,
            &Matrix::from([[1.0, -2.0]]),
            logistic_prime_from_output,
        )
        .unwrap();

        let a = logistic(2.0);
        check(&Matrix::from([[0.25, -2.0 * a * (1.0 - a)]]), &gradients);
    }
}
