use std::error::Error;
use std::fs::File;
use std::io::BufReader;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use backprop::linear_algebra::{Matrix, Value};
use backprop::synthetic::random_batch;
use backprop::{Manifest, Network, NetworkConfig};

use crate::args::Setup;

/// Everything needed to call the cost and gradient oracle once.
pub struct Problem {
    pub network: Network,
    pub manifest: Manifest,
    pub parameters: Vec<Value>,
    pub inputs: Matrix,
    pub targets: Matrix,
}

impl Problem {
    pub fn from_setup(setup: &Setup) -> Result<Self, Box<dyn Error>> {
        let config = match &setup.config {
            Some(filename) => load_network_config(filename)?,
            None => setup.network.0.clone(),
        };

        Self::random(&config, setup.batch.samples, setup.batch.seed)
    }

    /// Draws random parameters and a random batch for `config`.
    pub fn random(
        config: &NetworkConfig,
        samples: usize,
        seed: u64,
    ) -> Result<Self, Box<dyn Error>> {
        let network = config.network()?;
        let manifest = config.manifest()?;

        let mut rng = StdRng::seed_from_u64(seed);
        let parameters = network.random_parameters(&mut rng, &manifest)?;
        let (inputs, targets) = random_batch(&mut rng, samples, config.inputs, config.classes());

        info!(
            layers = network.layers(),
            parameters = parameters.len(),
            %manifest,
            samples,
            "Built network."
        );

        Ok(Self {
            network,
            manifest,
            parameters,
            inputs,
            targets,
        })
    }
}

pub fn load_network_config(filename: &str) -> Result<NetworkConfig, Box<dyn Error>> {
    let file = File::open(filename)?;
    let config = serde_json::from_reader(BufReader::new(file))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_parses() {
        let config: NetworkConfig =
            serde_json::from_str(include_str!("../networks/mnist_deep.json")).unwrap();
        assert_eq!(config, NetworkConfig::deep(784, [500, 500, 2000], 10));
    }

    #[test]
    fn random_problem_shapes() {
        let config = NetworkConfig::deep(6, [5, 4, 3], 2);
        let problem = Problem::random(&config, 7, 1).unwrap();

        assert_eq!(problem.network, Network::deep());
        assert_eq!(problem.parameters.len(), problem.manifest.parameter_count());
        assert_eq!(problem.inputs.shape(), [7, 6]);
        assert_eq!(problem.targets.shape(), [7, 2]);
    }

    #[test]
    fn invalid_config() {
        let config = NetworkConfig {
            inputs: 3,
            layers: Vec::new(),
        };
        assert!(Problem::random(&config, 1, 0).is_err());
    }

    #[test]
    fn missing_config_file() {
        assert!(load_network_config("does/not/exist.json").is_err());
    }
}
