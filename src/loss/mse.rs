pub struct MseLoss;

impl MseLoss {
    /// mean((p - y)²)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| (p - y).powi(2))
            .sum::<f64>() / n
    }

    /// 2(p - y) / n
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| 2.0 * (p - y) / n)
            .collect()
    }
}
