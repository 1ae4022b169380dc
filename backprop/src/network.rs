use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, trace};

use crate::activation::{
    identity, identity_prime_from_output, logistic, logistic_prime_from_output, softmax,
};
use crate::error::BackpropError;
use crate::flatten::{multi_flatten, multi_unflatten, Manifest};
use crate::layer::{
    activation_backward_from_output, activation_forward, fully_connected_backward,
    fully_connected_forward,
};
use crate::linear_algebra::{Matrix, Value};
use crate::loss::{cross_entropy, cross_entropy_prime};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Affine,
    Logistic,
    Softmax,
}

/// A feed-forward network described only by the activation of each layer.
///
/// Layer sizes come from the manifest passed alongside the parameters, so one `Network` can
/// evaluate any parameter vector with the right number of groups. Every layer owns two
/// groups, a `[fan_in, fan_out]` weight matrix followed by a `[1, fan_out]` bias row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Network {
    activations: Vec<Activation>,
}

impl Network {
    /// The output layer must be softmax, and it must be the only softmax layer.
    pub fn new(activations: Vec<Activation>) -> Result<Self, BackpropError> {
        match activations.split_last() {
            None => Err(BackpropError::InvalidArchitecture("network has no layers")),
            Some((&last, _)) if last != Activation::Softmax => Err(
                BackpropError::InvalidArchitecture("output layer must be softmax"),
            ),
            Some((_, hidden)) if hidden.contains(&Activation::Softmax) => {
                Err(BackpropError::InvalidArchitecture(
                    "softmax is only supported as the output layer",
                ))
            }
            _ => Ok(Self { activations }),
        }
    }

    /// A single softmax classifier layer.
    pub fn shallow() -> Self {
        Self {
            activations: vec![Activation::Softmax],
        }
    }

    /// Three logistic hidden layers followed by a softmax output layer.
    pub fn deep() -> Self {
        Self {
            activations: vec![
                Activation::Logistic,
                Activation::Logistic,
                Activation::Logistic,
                Activation::Softmax,
            ],
        }
    }

    pub fn activations(&self) -> &[Activation] {
        &self.activations
    }

    pub fn layers(&self) -> usize {
        self.activations.len()
    }

    /// Builds the manifest for a network with `inputs` features and the given layer sizes.
    pub fn manifest(&self, inputs: usize, sizes: &[usize]) -> Result<Manifest, BackpropError> {
        if sizes.len() != self.layers() {
            return Err(BackpropError::GroupCount {
                expected: 2 * self.layers(),
                found: 2 * sizes.len(),
            });
        }

        let mut fan_in = inputs;
        let mut shapes = Vec::with_capacity(2 * sizes.len());
        for &size in sizes {
            shapes.push([fan_in, size]);
            shapes.push([1, size]);
            fan_in = size;
        }

        Ok(Manifest::new(shapes))
    }

    /// Draws a parameter vector laid out according to `manifest`.
    ///
    /// Weights use Glorot-scaled normal initialization. Biases start at zero.
    pub fn random_parameters(
        &self,
        rng: &mut impl Rng,
        manifest: &Manifest,
    ) -> Result<Vec<Value>, BackpropError> {
        self.check_group_count(manifest)?;

        let mut parameters = Vec::with_capacity(manifest.parameter_count());
        for group in manifest.chunks_exact(2) {
            let [fan_in, fan_out] = group[0];
            let deviation = (2.0 / (fan_in + fan_out).max(1) as Value).sqrt();
            parameters.extend((0..fan_in * fan_out).map(|_| {
                let z: Value = rng.sample(StandardNormal);
                z * deviation
            }));

            let [rows, columns] = group[1];
            parameters.extend(std::iter::repeat(0.0).take(rows * columns));
        }

        Ok(parameters)
    }

    /// Runs the forward pass and returns the class probabilities for each sample.
    pub fn predict(
        &self,
        parameters: &[Value],
        manifest: &Manifest,
        inputs: &Matrix,
    ) -> Result<Matrix, BackpropError> {
        let matrices = self.unflatten(parameters, manifest)?;
        let mut outputs = self.forward(&matrices, inputs)?;
        outputs
            .pop()
            .ok_or(BackpropError::InvalidArchitecture("network has no layers"))
    }

    /// Evaluates the cross-entropy cost of `parameters` on a batch, along with its gradient.
    ///
    /// The gradient is flattened in the same layout as `parameters`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(layers = self.layers(), samples = inputs.rows())
    )]
    pub fn cost_gradient(
        &self,
        parameters: &[Value],
        manifest: &Manifest,
        inputs: &Matrix,
        targets: &Matrix,
    ) -> Result<(Value, Vec<Value>), BackpropError> {
        let matrices = self.unflatten(parameters, manifest)?;

        // Propagate forward ====================

        let outputs = self.forward(&matrices, inputs)?;
        let probabilities = outputs
            .last()
            .ok_or(BackpropError::InvalidArchitecture("network has no layers"))?;

        let cost = cross_entropy(probabilities, targets)?;

        // Propagate backward ===================

        // With a softmax output the log and exp cancel, leaving P - T at the logits.
        let mut delta = cross_entropy_prime(probabilities, targets)?;

        let mut gradients = Vec::with_capacity(matrices.len());
        for layer in (0..self.layers()).rev() {
            let layer_inputs = match layer {
                0 => inputs,
                _ => &outputs[layer - 1],
            };

            let (weight_gradients, bias_gradients, input_gradients) =
                fully_connected_backward(layer_inputs, &delta, &matrices[2 * layer])?;

            trace!(
                layer,
                weights = ?weight_gradients.shape(),
                biases = ?bias_gradients.shape(),
                "Backward"
            );

            gradients.push(bias_gradients);
            gradients.push(weight_gradients);

            if layer > 0 {
                delta = match self.activations[layer - 1] {
                    Activation::Logistic => activation_backward_from_output(
                        layer_inputs,
                        &input_gradients,
                        logistic_prime_from_output,
                    )?,
                    Activation::Affine => activation_backward_from_output(
                        layer_inputs,
                        &input_gradients,
                        identity_prime_from_output,
                    )?,
                    Activation::Softmax => {
                        return Err(BackpropError::InvalidArchitecture(
                            "softmax is only supported as the output layer",
                        ))
                    }
                };
            }
        }
        gradients.reverse();

        let (gradient, gradient_manifest) = multi_flatten(&gradients);
        check_manifest(manifest, gradient_manifest)?;

        debug!(cost, "Evaluated cost and gradient");

        Ok((cost, gradient))
    }

    /// Returns the output of every layer, the last being the class probabilities.
    fn forward(&self, matrices: &[Matrix], inputs: &Matrix) -> Result<Vec<Matrix>, BackpropError> {
        let mut outputs: Vec<Matrix> = Vec::with_capacity(self.layers());

        for (layer, (&activation, group)) in self
            .activations
            .iter()
            .zip(matrices.chunks_exact(2))
            .enumerate()
        {
            let layer_inputs = outputs.last().unwrap_or(inputs);
            let fully_connected = fully_connected_forward(layer_inputs, &group[0], &group[1])?;

            let output = match activation {
                Activation::Affine => activation_forward(&fully_connected, identity),
                Activation::Logistic => activation_forward(&fully_connected, logistic),
                Activation::Softmax => softmax(&fully_connected),
            };

            trace!(layer, ?activation, shape = ?output.shape(), "Forward");

            outputs.push(output);
        }

        Ok(outputs)
    }

    fn unflatten(
        &self,
        parameters: &[Value],
        manifest: &Manifest,
    ) -> Result<Vec<Matrix>, BackpropError> {
        self.check_group_count(manifest)?;
        multi_unflatten(parameters, manifest)
    }

    fn check_group_count(&self, manifest: &Manifest) -> Result<(), BackpropError> {
        if manifest.len() != 2 * self.layers() {
            return Err(BackpropError::GroupCount {
                expected: 2 * self.layers(),
                found: manifest.len(),
            });
        }
        Ok(())
    }
}

fn check_manifest(expected: &Manifest, found: Manifest) -> Result<(), BackpropError> {
    if *expected != found {
        return Err(BackpropError::InternalConsistency {
            expected: expected.clone(),
            found,
        });
    }
    Ok(())
}

/// Cost and gradient of a single softmax layer.
///
/// `manifest` must describe two groups: the weights and the bias row.
pub fn shallow_cost_gradient(
    parameters: &[Value],
    manifest: &Manifest,
    inputs: &Matrix,
    targets: &Matrix,
) -> Result<(Value, Vec<Value>), BackpropError> {
    Network::shallow().cost_gradient(parameters, manifest, inputs, targets)
}

/// Cost and gradient of three logistic layers topped by a softmax layer.
///
/// `manifest` must describe eight groups, ordered W0, b0, W1, b1, W2, b2, W3, b3.
pub fn deep_cost_gradient(
    parameters: &[Value],
    manifest: &Manifest,
    inputs: &Matrix,
    targets: &Matrix,
) -> Result<(Value, Vec<Value>), BackpropError> {
    Network::deep().cost_gradient(parameters, manifest, inputs, targets)
}
