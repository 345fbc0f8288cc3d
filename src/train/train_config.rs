use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::ImageOptions;
use crate::device::Device;
use crate::error::Result;
use crate::loss::LossType;
use crate::train::lr_finder::LrFinderConfig;
use crate::train::mode::Mode;

/// Options for a `Trainer` run.
///
/// # Fields
/// - `epochs`          — full passes over the training set
/// - `mode`            — classification / detection track accuracy, regression does not
/// - `loss`            — loss function applied to every sample
/// - `learning_rate`   — `None` runs the learning-rate finder when the trainer is built
/// - `weight_decay`    — L2 penalty handed to the default Adam optimizer
/// - `model_save_path` — directory receiving the `model` checkpoint after every epoch
/// - `device`          — resolved once when the trainer is built
/// - `progress`        — draw a progress bar per pass
/// - `image`           — how `Trainer::evaluate` decodes image directories
/// - `lr_finder`       — range-test settings
///
/// Combinations are not validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub epochs: usize,
    pub mode: Mode,
    pub loss: LossType,
    pub learning_rate: Option<f64>,
    pub weight_decay: f64,
    pub model_save_path: PathBuf,
    pub device: Device,
    pub progress: bool,
    pub image: ImageOptions,
    pub lr_finder: LrFinderConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 10,
            mode: Mode::Classification,
            loss: LossType::Mse,
            learning_rate: None,
            weight_decay: 1e-5,
            model_save_path: PathBuf::from("./"),
            device: Device::Auto,
            progress: true,
            image: ImageOptions::default(),
            lr_finder: LrFinderConfig::default(),
        }
    }
}

impl TrainConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn load_json(path: impl AsRef<Path>) -> Result<TrainConfig> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Where the per-epoch checkpoint is written.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.model_save_path.join("model")
    }
}
