use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::{detection_exact_match, exact_match};

/// What the model is being trained to do. Decides whether accuracy is
/// tracked and over which outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// A sample counts as correct when the whole rounded output matches.
    #[default]
    Classification,
    /// A sample counts as correct when the rounded bounding-box outputs match.
    Detection,
    /// Loss only.
    Regression,
}

impl Mode {
    pub fn tracks_accuracy(self) -> bool {
        matches!(self, Mode::Classification | Mode::Detection)
    }

    /// 1.0 or 0.0 for one prediction, or `None` when this mode does not
    /// track accuracy.
    pub fn score(self, predicted: &[f64], label: &[f64]) -> Option<Result<f64>> {
        match self {
            Mode::Classification => Some(exact_match(predicted, label)),
            Mode::Detection => Some(detection_exact_match(predicted, label)),
            Mode::Regression => None,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Mode> {
        match s.to_ascii_lowercase().as_str() {
            "classification" => Ok(Mode::Classification),
            "detection" => Ok(Mode::Detection),
            "regression" => Ok(Mode::Regression),
            other => Err(Error::InvalidData(format!("unknown mode '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regression_has_no_accuracy() {
        assert!(Mode::Regression.score(&[1.0], &[1.0]).is_none());
        assert!(!Mode::Regression.tracks_accuracy());
        assert_eq!(Mode::Classification.score(&[0.9], &[1.0]).unwrap().unwrap(), 1.0);
    }

    #[test]
    fn classification_scores_whole_samples() {
        let label = [0.0, 0.0, 0.0, 1.0, 0.0];
        let wrong = [0.1, 0.0, 0.0, 0.2, 0.9];
        assert_eq!(Mode::Classification.score(&wrong, &label).unwrap().unwrap(), 0.0);
    }

    #[test]
    fn detection_scores_only_the_box() {
        let label = [1.0, 3.0, 4.0, 5.0, 6.0, 1.0];
        // class and trailing outputs wrong, box right
        let pred = [0.0, 3.1, 3.9, 5.2, 6.0, 0.0];
        assert_eq!(Mode::Detection.score(&pred, &label).unwrap().unwrap(), 1.0);
        assert_eq!(Mode::Classification.score(&pred, &label).unwrap().unwrap(), 0.0);
        let off_box = [1.0, 3.0, 4.0, 5.0, 7.0, 1.0];
        assert_eq!(Mode::Detection.score(&off_box, &label).unwrap().unwrap(), 0.0);
        assert!(Mode::Detection.score(&[1.0, 2.0], &[1.0, 2.0]).unwrap().is_err());
    }
}
