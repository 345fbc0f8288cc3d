use std::fmt;

use serde::{Deserialize, Serialize};

/// Summary of one finished epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    pub total_epochs: usize,
    /// Mean training loss over the epoch's samples.
    pub train_loss: f64,
    pub val_loss: Option<f64>,
    /// Fraction in [0, 1]; only for modes that track accuracy.
    pub train_accuracy: Option<f64>,
    pub val_accuracy: Option<f64>,
    pub elapsed_ms: u64,
}

impl fmt::Display for EpochStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} -- Train Loss: {}", self.epoch, self.total_epochs, self.train_loss)?;
        if let Some(acc) = self.train_accuracy {
            write!(f, " -- Train acc: {}%", acc * 100.0)?;
        }
        if let Some(loss) = self.val_loss {
            write!(f, " -- Val Loss: {loss}")?;
        }
        if let Some(acc) = self.val_accuracy {
            write!(f, " -- Val acc: {}%", acc * 100.0)?;
        }
        // `{:#}` appends the epoch's wall time
        if f.alternate() {
            write!(f, " -- {}ms", self.elapsed_ms)?;
        }
        Ok(())
    }
}

/// Per-split series, one entry per epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub train: Vec<f64>,
    pub val: Vec<f64>,
}

/// Everything `Trainer::fit` records.
///
/// `accuracy` is `Some` only for modes that track it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    pub losses: Series,
    pub accuracy: Option<Series>,
}

impl History {
    pub fn epochs(&self) -> usize {
        self.losses.train.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> EpochStats {
        EpochStats {
            epoch: 2,
            total_epochs: 5,
            train_loss: 0.5,
            val_loss: None,
            train_accuracy: None,
            val_accuracy: None,
            elapsed_ms: 3,
        }
    }

    #[test]
    fn formats_loss_only() {
        assert_eq!(stats().to_string(), "2/5 -- Train Loss: 0.5");
    }

    #[test]
    fn alternate_form_appends_elapsed_time() {
        assert_eq!(format!("{:#}", stats()), "2/5 -- Train Loss: 0.5 -- 3ms");
    }

    #[test]
    fn formats_all_segments() {
        let s = EpochStats {
            val_loss: Some(0.25),
            train_accuracy: Some(0.5),
            val_accuracy: Some(0.75),
            ..stats()
        };
        assert_eq!(
            s.to_string(),
            "2/5 -- Train Loss: 0.5 -- Train acc: 50% -- Val Loss: 0.25 -- Val acc: 75%"
        );
    }
}
