pub mod activation;
pub mod data;
pub mod device;
pub mod error;
pub mod layers;
pub mod loss;
pub mod math;
pub mod metrics;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use activation::ActivationFunction;
pub use data::{Dataset, ImageDataset, InMemoryDataset};
pub use device::Device;
pub use error::{Error, Result};
pub use layers::Layer;
pub use loss::LossType;
pub use math::Matrix;
pub use metrics::accuracy;
pub use network::{Model, Network, NetworkSpec};
pub use optim::{Adam, Optimizer, Sgd};
pub use train::{evaluate_model, Evaluation, History, LrFinder, Mode, TrainConfig, Trainer};
