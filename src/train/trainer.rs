use std::path::Path;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use serde::Serialize;

use crate::data::{Dataset, ImageDataset};
use crate::device::Device;
use crate::error::{Error, Result};
use crate::network::Model;
use crate::optim::{Adam, Optimizer};
use crate::train::epoch_stats::{EpochStats, History, Series};
use crate::train::lr_finder::LrFinder;
use crate::train::train_config::TrainConfig;

/// Epoch loop around a model, its datasets and an optimizer.
///
/// Training is online: one sample per forward/backward/step, visiting the
/// training set in index order.
pub struct Trainer<M: Model> {
    model: M,
    trainset: Box<dyn Dataset>,
    valset: Option<Box<dyn Dataset>>,
    optimizer: Box<dyn Optimizer>,
    config: TrainConfig,
    learning_rate: f64,
    device: Device,
}

/// Averages collected over one pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    pub loss: f64,
    /// `None` for modes that do not track accuracy.
    pub accuracy: Option<f64>,
}

impl<M: Model + Clone> Trainer<M> {
    /// Builds a trainer.
    ///
    /// Without `config.learning_rate` the learning-rate finder runs first on
    /// a copy of `model`. Without `optimizer`, Adam is used with that rate and
    /// `config.weight_decay`.
    pub fn new(
        model: M,
        trainset: Box<dyn Dataset>,
        valset: Option<Box<dyn Dataset>>,
        optimizer: Option<Box<dyn Optimizer>>,
        config: TrainConfig,
    ) -> Result<Trainer<M>> {
        let device = config.device.resolve()?;
        debug!("training on {device}");

        let learning_rate = match config.learning_rate {
            Some(lr) => lr,
            None => {
                let lr = run_lr_finder(&model, trainset.as_ref(), &config)?;
                info!("learning-rate finder suggests {lr:e}");
                lr
            }
        };

        let optimizer = optimizer
            .unwrap_or_else(|| Box::new(Adam::new(learning_rate, config.weight_decay)));

        Ok(Trainer { model, trainset, valset, optimizer, config, learning_rate, device })
    }

    /// Runs the learning-rate finder against the current model and training set.
    pub fn find_lr(&self) -> Result<f64> {
        run_lr_finder(&self.model, self.trainset.as_ref(), &self.config)
    }
}

impl<M: Model> Trainer<M> {
    /// Trains for `config.epochs` epochs, checkpointing after each one.
    ///
    /// Returns per-epoch mean losses, plus accuracies when the mode tracks
    /// them. Any model, loss or dataset error aborts the run.
    pub fn fit(&mut self) -> Result<History> {
        let tracks_accuracy = self.config.mode.tracks_accuracy();
        let mut history = History {
            losses: Series::default(),
            accuracy: tracks_accuracy.then(Series::default),
        };
        let total_epochs = self.config.epochs;

        for epoch in 1..=total_epochs {
            let t_start = Instant::now();

            self.model.set_training(true);
            let train = run_pass(
                &mut self.model,
                self.trainset.as_ref(),
                Some(self.optimizer.as_mut() as &mut dyn Optimizer),
                &self.config,
                "train",
            )?;
            history.losses.train.push(train.loss);

            let val = match self.valset.as_deref() {
                Some(valset) => {
                    self.model.set_training(false);
                    let val = run_pass(&mut self.model, valset, None, &self.config, "val")?;
                    history.losses.val.push(val.loss);
                    Some(val)
                }
                None => None,
            };

            if let Some(acc) = history.accuracy.as_mut() {
                if let Some(a) = val.as_ref().and_then(|v| v.accuracy) {
                    acc.val.push(a);
                }
                if let Some(a) = train.accuracy {
                    acc.train.push(a);
                }
            }

            let stats = EpochStats {
                epoch,
                total_epochs,
                train_loss: train.loss,
                val_loss: val.as_ref().map(|v| v.loss),
                train_accuracy: train.accuracy,
                val_accuracy: val.as_ref().and_then(|v| v.accuracy),
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            info!("{stats:#}");

            self.save_checkpoint()?;
        }

        Ok(history)
    }

    /// Predicts one sample; with a label, also returns its loss.
    pub fn test_sample(&mut self, input: &[f64], label: Option<&[f64]>) -> Result<(Vec<f64>, Option<f64>)> {
        let pred = self.model.forward(input)?;
        let loss = label
            .map(|label| self.config.loss.loss(&pred, label))
            .transpose()?;
        Ok((pred, loss))
    }

    /// Mean loss over the image dataset at `test_path`.
    pub fn evaluate(&mut self, test_path: impl AsRef<Path>) -> Result<f64> {
        let testset = ImageDataset::open(test_path, self.config.image)?;
        Ok(evaluate_model(&mut self.model, &testset, &self.config)?.loss)
    }

    /// Overwrites `<model_save_path>/model` with the current model.
    pub fn save_checkpoint(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config.model_save_path)?;
        let path = self.config.checkpoint_path();
        self.model.save_json(&path)?;
        debug!("checkpoint written to {}", path.display());
        Ok(())
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }

    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn device(&self) -> Device {
        self.device
    }
}

/// Forward-only pass of `model` over `dataset`, scored with `config.loss`
/// and `config.mode`.
pub fn evaluate_model<M: Model>(model: &mut M, dataset: &dyn Dataset, config: &TrainConfig) -> Result<Evaluation> {
    model.set_training(false);
    run_pass(model, dataset, None, config, "test")
}

fn run_lr_finder<M: Model + Clone>(model: &M, trainset: &dyn Dataset, config: &TrainConfig) -> Result<f64> {
    let result = LrFinder::new(config.lr_finder).run(model, trainset, config.loss, config.weight_decay)?;
    Ok(result.suggestion)
}

/// One pass over `dataset`. With an optimizer every sample is followed by
/// backward, step and zero_grad; without one the pass is forward only.
fn run_pass<M: Model>(
    model: &mut M,
    dataset: &dyn Dataset,
    mut optimizer: Option<&mut dyn Optimizer>,
    config: &TrainConfig,
    label: &str,
) -> Result<Evaluation> {
    let n = dataset.len();
    if n == 0 {
        return Err(Error::EmptyDataset);
    }

    let bar = progress_bar(n, label, config.progress);
    let mut loss_sum = 0.0;
    let mut acc_sum = 0.0;
    let mut acc_count = 0usize;

    for idx in 0..n {
        let (input, target) = dataset.get(idx)?;
        let pred = model.forward(&input)?;
        loss_sum += config.loss.loss(&pred, &target)?;

        if let Some(score) = config.mode.score(&pred, &target) {
            acc_sum += score?;
            acc_count += 1;
        }

        if let Some(opt) = optimizer.as_deref_mut() {
            model.backward(&config.loss.derivative(&pred, &target)?)?;
            opt.step(model);
            model.zero_grad();
        }
        bar.inc(1);
    }
    bar.finish_and_clear();

    Ok(Evaluation {
        loss: loss_sum / n as f64,
        accuracy: (acc_count > 0).then(|| acc_sum / acc_count as f64),
    })
}

fn progress_bar(len: usize, label: &str, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::default_bar()
        .template(&format!("{label:>5} [{{bar:40}}] {{pos:>7}}/{{len:7}} [eta: {{eta}}]"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    ProgressBar::new(len as u64).with_style(style)
}
