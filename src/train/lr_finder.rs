use serde::{Deserialize, Serialize};

use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::loss::LossType;
use crate::network::Model;
use crate::optim::{Adam, Optimizer};

/// Learning-rate range test settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LrFinderConfig {
    pub start_lr: f64,
    pub end_lr: f64,
    /// Single-sample steps in the sweep; the training set is cycled.
    pub num_iter: usize,
    /// Exponential smoothing factor applied to the loss.
    pub smooth_f: f64,
    /// Stop once the smoothed loss exceeds `diverge_th` × best loss.
    pub diverge_th: f64,
    /// Points ignored at each end of the curve when picking the rate.
    pub skip_start: usize,
    pub skip_end: usize,
}

impl Default for LrFinderConfig {
    fn default() -> Self {
        LrFinderConfig {
            start_lr: 1e-7,
            end_lr: 10.0,
            num_iter: 100,
            smooth_f: 0.05,
            diverge_th: 5.0,
            skip_start: 10,
            skip_end: 5,
        }
    }
}

/// Outcome of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct LrFinderResult {
    pub lrs: Vec<f64>,
    /// Smoothed losses, aligned with `lrs`.
    pub losses: Vec<f64>,
    pub suggestion: f64,
}

/// Sweeps the learning rate exponentially and suggests the rate where the
/// smoothed loss falls fastest.
#[derive(Debug, Clone, Default)]
pub struct LrFinder {
    config: LrFinderConfig,
}

impl LrFinder {
    pub fn new(config: LrFinderConfig) -> LrFinder {
        LrFinder { config }
    }

    /// Runs the sweep on a copy of `model`; the caller's model is untouched.
    pub fn run<M: Model + Clone>(
        &self,
        model: &M,
        dataset: &dyn Dataset,
        loss: LossType,
        weight_decay: f64,
    ) -> Result<LrFinderResult> {
        let cfg = self.config;
        if dataset.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if !(cfg.start_lr > 0.0 && cfg.end_lr > cfg.start_lr && cfg.num_iter >= 2) {
            return Err(Error::LrFinder(format!(
                "need 0 < start_lr < end_lr and num_iter >= 2, got {cfg:?}"
            )));
        }

        let mut model = model.clone();
        model.set_training(true);
        let mut optimizer = Adam::new(cfg.start_lr, weight_decay);
        let ratio = cfg.end_lr / cfg.start_lr;

        let mut lrs = Vec::with_capacity(cfg.num_iter);
        let mut losses: Vec<f64> = Vec::with_capacity(cfg.num_iter);
        let mut best = f64::INFINITY;

        for iter in 0..cfg.num_iter {
            let lr = cfg.start_lr * ratio.powf(iter as f64 / (cfg.num_iter - 1) as f64);
            optimizer.set_learning_rate(lr);

            let (input, label) = dataset.get(iter % dataset.len())?;
            let pred = model.forward(&input)?;
            let raw = loss.loss(&pred, &label)?;
            model.backward(&loss.derivative(&pred, &label)?)?;
            optimizer.step(&mut model);
            model.zero_grad();

            let smoothed = match losses.last() {
                Some(prev) => cfg.smooth_f * raw + (1.0 - cfg.smooth_f) * prev,
                None => raw,
            };
            if !smoothed.is_finite() {
                log::warn!("loss became non-finite at lr {lr:e}, stopping sweep");
                break;
            }
            lrs.push(lr);
            losses.push(smoothed);
            log::trace!("lr {lr:e} loss {smoothed}");

            best = best.min(smoothed);
            if smoothed > cfg.diverge_th * best {
                log::debug!("loss diverged at lr {lr:e}, stopping sweep");
                break;
            }
        }

        let suggestion = suggest(&lrs, &losses, cfg.skip_start, cfg.skip_end)
            .ok_or_else(|| Error::LrFinder("no finite loss recorded".into()))?;
        Ok(LrFinderResult { lrs, losses, suggestion })
    }
}

/// Rate at the steepest descent of the loss curve, trimmed by `skip_*` when
/// enough points remain; the rate of the lowest loss for very short curves.
fn suggest(lrs: &[f64], losses: &[f64], skip_start: usize, skip_end: usize) -> Option<f64> {
    let n = losses.len();
    let (lo, hi) = if n > skip_start + skip_end + 2 {
        (skip_start, n - skip_end)
    } else {
        (0, n)
    };
    let (lrs, losses) = (&lrs[lo..hi], &losses[lo..hi]);

    if losses.len() < 3 {
        return losses
            .iter()
            .zip(lrs)
            .min_by(|a, b| a.0.total_cmp(b.0))
            .map(|(_, &lr)| lr);
    }
    losses
        .windows(2)
        .map(|w| w[1] - w[0])
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| lrs[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::ActivationFunction;
    use crate::data::InMemoryDataset;
    use crate::network::Network;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn suggests_steepest_drop() {
        let lrs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let losses = [1.0, 0.9, 0.4, 0.35, 0.5];
        assert_eq!(suggest(&lrs, &losses, 0, 0), Some(2.0));
    }

    #[test]
    fn short_curves_fall_back_to_minimum() {
        assert_eq!(suggest(&[1.0, 2.0], &[0.5, 0.3], 10, 5), Some(2.0));
        assert_eq!(suggest(&[], &[], 10, 5), None);
    }

    #[test]
    fn sweep_stays_in_range_and_leaves_model_alone() {
        let net = Network::with_rng(
            vec![(4, 2, ActivationFunction::Tanh), (1, 4, ActivationFunction::Identity)],
            &mut StdRng::seed_from_u64(11),
        );
        let before = net.layers[0].weights.clone();
        let data = InMemoryDataset::from_samples((0..20).map(|i| {
            let x = i as f64 / 20.0;
            (vec![x, 1.0 - x], vec![2.0 * x - 0.5])
        }));
        let finder = LrFinder::new(LrFinderConfig::default());
        let result = finder.run(&net, &data, LossType::Mse, 0.0).unwrap();

        assert!(result.suggestion.is_finite());
        assert!(result.suggestion >= 1e-7 && result.suggestion <= 10.0);
        assert_eq!(result.lrs.len(), result.losses.len());
        assert!(result.lrs.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(net.layers[0].weights, before);
    }

    fn tanh_net(seed: u64) -> Network {
        Network::with_rng(
            vec![(4, 2, ActivationFunction::Tanh), (1, 4, ActivationFunction::Identity)],
            &mut StdRng::seed_from_u64(seed),
        )
    }

    fn line(n: usize) -> InMemoryDataset {
        InMemoryDataset::from_samples((0..n).map(|i| {
            let x = i as f64 / n as f64;
            (vec![x, 1.0 - x], vec![2.0 * x - 0.5])
        }))
    }

    #[test]
    fn sweep_stops_once_loss_diverges() {
        let cfg = LrFinderConfig { start_lr: 1.0, end_lr: 1e4, ..LrFinderConfig::default() };
        let result = LrFinder::new(cfg).run(&tanh_net(3), &line(20), LossType::Mse, 0.0).unwrap();

        assert!(result.lrs.len() < cfg.num_iter);
        let best = result.losses.iter().copied().fold(f64::INFINITY, f64::min);
        let last = *result.losses.last().unwrap();
        assert!(last > cfg.diverge_th * best, "last {last}, best {best}");
    }

    #[test]
    fn non_finite_loss_ends_the_sweep() {
        let mut samples = vec![(vec![0.5, 1.0], vec![0.5]); 3];
        samples.push((vec![0.0, 1.0], vec![f64::NAN]));
        let data = InMemoryDataset::from_samples(samples);

        let result = LrFinder::default().run(&tanh_net(4), &data, LossType::Mse, 0.0).unwrap();
        assert_eq!(result.lrs.len(), 3);
        assert!(result.losses.iter().all(|l| l.is_finite()));

        let all_nan = InMemoryDataset::from_samples(vec![(vec![0.0, 1.0], vec![f64::NAN])]);
        assert!(matches!(
            LrFinder::default().run(&tanh_net(4), &all_nan, LossType::Mse, 0.0),
            Err(Error::LrFinder(_))
        ));
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let net = Network::new(vec![(1, 1, ActivationFunction::Identity)]);
        let finder = LrFinder::default();
        assert!(matches!(
            finder.run(&net, &InMemoryDataset::default(), LossType::Mse, 0.0),
            Err(Error::EmptyDataset)
        ));
    }
}
