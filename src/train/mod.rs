pub mod epoch_stats;
pub mod lr_finder;
pub mod mode;
pub mod train_config;
pub mod trainer;

pub use epoch_stats::{EpochStats, History, Series};
pub use lr_finder::{LrFinder, LrFinderConfig, LrFinderResult};
pub use mode::Mode;
pub use train_config::TrainConfig;
pub use trainer::{evaluate_model, Evaluation, Trainer};
