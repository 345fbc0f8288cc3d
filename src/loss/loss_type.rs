use serde::{Deserialize, Serialize};

use crate::error::{check_len, Error, Result};
use crate::loss::{BceLoss, CrossEntropyLoss, HuberLoss, MaeLoss, MseLoss};

/// Loss function used by the trainer.
///
/// - `Mse`                — mean-squared error; the default.
/// - `CrossEntropy`       — categorical cross-entropy; pair with a Softmax output.
/// - `BinaryCrossEntropy` — pair with a Sigmoid output.
/// - `Mae`                — mean absolute error.
/// - `Huber`              — Huber loss with δ = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossType {
    #[default]
    Mse,
    CrossEntropy,
    BinaryCrossEntropy,
    Mae,
    Huber,
}

impl LossType {
    /// Scalar loss for one sample.
    pub fn loss(self, predicted: &[f64], expected: &[f64]) -> Result<f64> {
        Self::check(predicted, expected)?;
        Ok(match self {
            LossType::Mse => MseLoss::loss(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::loss(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::loss(predicted, expected),
            LossType::Mae => MaeLoss::loss(predicted, expected),
            LossType::Huber => HuberLoss::loss(predicted, expected),
        })
    }

    /// `∂L/∂predicted` for one sample.
    pub fn derivative(self, predicted: &[f64], expected: &[f64]) -> Result<Vec<f64>> {
        Self::check(predicted, expected)?;
        Ok(match self {
            LossType::Mse => MseLoss::derivative(predicted, expected),
            LossType::CrossEntropy => CrossEntropyLoss::derivative(predicted, expected),
            LossType::BinaryCrossEntropy => BceLoss::derivative(predicted, expected),
            LossType::Mae => MaeLoss::derivative(predicted, expected),
            LossType::Huber => HuberLoss::derivative(predicted, expected),
        })
    }

    fn check(predicted: &[f64], expected: &[f64]) -> Result<()> {
        check_len(predicted.len(), expected.len())?;
        if predicted.is_empty() {
            return Err(Error::InvalidData("loss over an empty prediction".into()));
        }
        Ok(())
    }
}

impl std::str::FromStr for LossType {
    type Err = Error;

    fn from_str(s: &str) -> Result<LossType> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "mse" => Ok(LossType::Mse),
            "cross_entropy" | "ce" => Ok(LossType::CrossEntropy),
            "binary_cross_entropy" | "bce" => Ok(LossType::BinaryCrossEntropy),
            "mae" | "l1" => Ok(LossType::Mae),
            "huber" => Ok(LossType::Huber),
            other => Err(Error::InvalidData(format!("unknown loss '{other}'"))),
        }
    }
}
