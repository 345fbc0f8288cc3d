use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::{Error, Result};
use crate::loss::LossType;
use crate::network::network::Network;

/// One layer of an architecture description.
///
/// `input_size` must equal the previous layer's `size` (or the raw input
/// dimension for the first layer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub size: usize,
    pub input_size: usize,
    pub activation: ActivationFunction,
}

/// Architecture of a network plus the loss it is meant to be trained with.
///
/// Kept apart from trained weights so an architecture can be written by hand
/// and handed to the `train` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub name: String,
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub loss: LossType,
    /// Seed for weight initialization; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    pub fn load_json(path: impl AsRef<Path>) -> Result<NetworkSpec> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Checks that consecutive layers connect.
    pub fn validate(&self) -> Result<()> {
        if self.layers.is_empty() {
            return Err(Error::InvalidData(format!("network '{}' has no layers", self.name)));
        }
        for pair in self.layers.windows(2) {
            if pair[1].input_size != pair[0].size {
                return Err(Error::ShapeMismatch {
                    expected: pair[0].size,
                    got: pair[1].input_size,
                });
            }
        }
        Ok(())
    }

    /// Initializes a fresh network for this architecture.
    pub fn build(&self) -> Result<Network> {
        self.validate()?;
        let layers = self
            .layers
            .iter()
            .map(|l| (l.size, l.input_size, l.activation))
            .collect();
        let network = match self.seed {
            Some(seed) => Network::with_rng(layers, &mut StdRng::seed_from_u64(seed)),
            None => Network::new(layers),
        };
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: &str = r#"{
        "name": "tiny",
        "layers": [
            { "size": 4, "input_size": 2, "activation": "ReLU" },
            { "size": 1, "input_size": 4, "activation": "Sigmoid" }
        ],
        "loss": "binary_cross_entropy",
        "seed": 3
    }"#;

    #[test]
    fn parses_and_builds() {
        let spec: NetworkSpec = serde_json::from_str(SPEC).unwrap();
        assert_eq!(spec.loss, LossType::BinaryCrossEntropy);
        let net = spec.build().unwrap();
        assert_eq!(net.input_size(), 2);
        assert_eq!(net.output_size(), 1);
    }

    #[test]
    fn seeded_builds_are_identical() {
        let spec: NetworkSpec = serde_json::from_str(SPEC).unwrap();
        let a = spec.build().unwrap();
        let b = spec.build().unwrap();
        assert_eq!(a.layers[0].weights, b.layers[0].weights);
    }

    #[test]
    fn rejects_disconnected_layers() {
        let mut spec: NetworkSpec = serde_json::from_str(SPEC).unwrap();
        spec.layers[1].input_size = 5;
        assert!(matches!(
            spec.build(),
            Err(Error::ShapeMismatch { expected: 4, got: 5 })
        ));
    }
}
