//! Finite-difference verification of analytic gradients.

use tracing::debug;

use crate::error::BackpropError;
use crate::flatten::Manifest;
use crate::linear_algebra::{Matrix, Value};
use crate::network::Network;

pub const DEFAULT_EPSILON: Value = 1e-5;

#[derive(Clone, Debug)]
pub struct GradientCheck {
    pub cost: Value,
    pub analytic: Vec<Value>,
    pub numeric: Vec<Value>,
    /// The largest [`relative_error`] between matching entries of the two gradients.
    pub max_relative_error: Value,
}

/// Approximates the gradient of `cost` at `parameters` with centered differences.
pub fn numerical_gradient<F>(
    mut cost: F,
    parameters: &[Value],
    epsilon: Value,
) -> Result<Vec<Value>, BackpropError>
where
    F: FnMut(&[Value]) -> Result<Value, BackpropError>,
{
    let mut perturbed = parameters.to_vec();
    let mut gradient = Vec::with_capacity(parameters.len());

    for i in 0..perturbed.len() {
        let original = perturbed[i];

        perturbed[i] = original + epsilon;
        let plus = cost(&perturbed)?;
        perturbed[i] = original - epsilon;
        let minus = cost(&perturbed)?;
        perturbed[i] = original;

        gradient.push((plus - minus) / (2.0 * epsilon));
    }

    Ok(gradient)
}

/// The difference between `a` and `b` relative to the larger of their magnitudes.
///
/// Below a magnitude of one the absolute difference is used instead, so entries that are
/// nearly zero don't dominate the comparison.
pub fn relative_error(a: Value, b: Value) -> Value {
    (a - b).abs() / a.abs().max(b.abs()).max(1.0)
}

/// Compares the gradient returned by `network` against a numerical approximation.
pub fn check_gradient(
    network: &Network,
    parameters: &[Value],
    manifest: &Manifest,
    inputs: &Matrix,
    targets: &Matrix,
    epsilon: Value,
) -> Result<GradientCheck, BackpropError> {
    let (cost, analytic) = network.cost_gradient(parameters, manifest, inputs, targets)?;

    let numeric = numerical_gradient(
        |parameters| {
            network
                .cost_gradient(parameters, manifest, inputs, targets)
                .map(|(cost, _)| cost)
        },
        parameters,
        epsilon,
    )?;

    let max_relative_error = analytic
        .iter()
        .zip(&numeric)
        .map(|(&a, &n)| relative_error(a, n))
        .fold(0.0, Value::max);

    debug!(parameters = parameters.len(), max_relative_error, "Checked gradient");

    Ok(GradientCheck {
        cost,
        analytic,
        numeric,
        max_relative_error,
    })
}
