use std::ops::Range;

use crate::error::{check_len, Error, Result};

/// Output positions holding the bounding box in detection mode.
pub const DETECTION_WINDOW: Range<usize> = 1..5;

/// Fraction of predictions that equal their label once rounded to the
/// nearest integer.
///
/// Labels are expected to hold integer values.
pub fn accuracy(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    check_len(predictions.len(), labels.len())?;
    if predictions.is_empty() {
        return Err(Error::EmptyDataset);
    }
    let correct = predictions
        .iter()
        .zip(labels)
        .filter(|(p, l)| p.round() == l.round())
        .count();
    Ok(correct as f64 / predictions.len() as f64)
}

/// 1.0 when every rounded prediction equals its label, 0.0 otherwise.
///
/// This is the per-sample score the trainer averages over an epoch.
pub fn exact_match(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    let score = accuracy(predictions, labels)?;
    Ok(if score == 1.0 { 1.0 } else { 0.0 })
}

/// `accuracy` restricted to the bounding-box window of a detection output.
pub fn detection_accuracy(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    let (predictions, labels) = detection_window(predictions, labels)?;
    accuracy(predictions, labels)
}

/// `exact_match` restricted to the bounding-box window.
pub fn detection_exact_match(predictions: &[f64], labels: &[f64]) -> Result<f64> {
    let (predictions, labels) = detection_window(predictions, labels)?;
    exact_match(predictions, labels)
}

fn detection_window<'a>(predictions: &'a [f64], labels: &'a [f64]) -> Result<(&'a [f64], &'a [f64])> {
    let end = DETECTION_WINDOW.end;
    if predictions.len() < end {
        return Err(Error::ShapeMismatch { expected: end, got: predictions.len() });
    }
    if labels.len() < end {
        return Err(Error::ShapeMismatch { expected: end, got: labels.len() });
    }
    Ok((&predictions[DETECTION_WINDOW], &labels[DETECTION_WINDOW]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identical_rounded_vectors_score_one() {
        assert_relative_eq!(accuracy(&[0.9, 0.2, 2.4], &[1.0, 0.0, 2.0]).unwrap(), 1.0);
    }

    #[test]
    fn partial_matches_are_a_fraction() {
        assert_relative_eq!(accuracy(&[0.9, 0.6, 0.1, 0.4], &[1.0, 0.0, 0.0, 1.0]).unwrap(), 0.5);
    }

    #[test]
    fn empty_and_mismatched_inputs_fail() {
        assert!(matches!(accuracy(&[], &[]), Err(Error::EmptyDataset)));
        assert!(matches!(
            accuracy(&[1.0], &[1.0, 0.0]),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn detection_only_scores_the_box() {
        // class score at 0 is wrong, box coordinates all right
        let pred = [0.0, 10.2, 20.4, 29.6, 40.0, 7.0];
        let label = [1.0, 10.0, 20.0, 30.0, 40.0, 0.0];
        assert_relative_eq!(detection_accuracy(&pred, &label).unwrap(), 1.0);
        assert!(detection_accuracy(&pred[..3], &label[..3]).is_err());
    }

    #[test]
    fn one_wrong_element_fails_the_whole_sample() {
        // one-hot class 3 of 10, predicted as class 7
        let mut label = [0.0; 10];
        label[3] = 1.0;
        let mut pred = [0.1; 10];
        pred[7] = 0.9;
        assert_relative_eq!(accuracy(&pred, &label).unwrap(), 0.8);
        assert_eq!(exact_match(&pred, &label).unwrap(), 0.0);
        assert_eq!(exact_match(&label, &label).unwrap(), 1.0);
    }

    #[test]
    fn detection_exact_match_ignores_outside_the_box() {
        let label = [1.0, 10.0, 20.0, 30.0, 40.0, 0.0];
        assert_eq!(detection_exact_match(&[0.0, 10.2, 20.4, 29.6, 40.0, 7.0], &label).unwrap(), 1.0);
        assert_eq!(detection_exact_match(&[1.0, 10.0, 20.0, 30.0, 41.0, 0.0], &label).unwrap(), 0.0);
    }
}
