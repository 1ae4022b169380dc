use serde::{Deserialize, Serialize};

use crate::error::BackpropError;
use crate::flatten::Manifest;
use crate::network::{Activation, Network};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct LayerConfig {
    pub activation: Activation,
    pub size: usize,
}

/// A network architecture with concrete layer sizes.
///
/// ```json
/// {
///   "inputs": 784,
///   "layers": [
///     { "activation": "logistic", "size": 500 },
///     { "activation": "softmax", "size": 10 }
///   ]
/// }
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct NetworkConfig {
    pub inputs: usize,
    pub layers: Vec<LayerConfig>,
}

impl NetworkConfig {
    pub fn shallow(inputs: usize, classes: usize) -> Self {
        Self {
            inputs,
            layers: vec![LayerConfig {
                activation: Activation::Softmax,
                size: classes,
            }],
        }
    }

    pub fn deep(inputs: usize, hidden: [usize; 3], classes: usize) -> Self {
        let mut layers = hidden
            .iter()
            .map(|&size| LayerConfig {
                activation: Activation::Logistic,
                size,
            })
            .collect::<Vec<_>>();
        layers.push(LayerConfig {
            activation: Activation::Softmax,
            size: classes,
        });

        Self { inputs, layers }
    }

    pub fn network(&self) -> Result<Network, BackpropError> {
        Network::new(self.layers.iter().map(|layer| layer.activation).collect())
    }

    pub fn manifest(&self) -> Result<Manifest, BackpropError> {
        let sizes = self.layers.iter().map(|layer| layer.size).collect::<Vec<_>>();
        self.network()?.manifest(self.inputs, &sizes)
    }

    /// The width of the output layer.
    pub fn classes(&self) -> usize {
        self.layers.last().map_or(0, |layer| layer.size)
    }
}
