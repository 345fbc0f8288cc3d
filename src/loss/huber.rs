pub struct HuberLoss;

const DELTA: f64 = 1.0;

impl HuberLoss {
    /// mean(h(p - y)) with h(x) = x²/2 for |x| ≤ δ, δ(|x| - δ/2) beyond.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| {
                let x = p - y;
                if x.abs() <= DELTA {
                    0.5 * x * x
                } else {
                    DELTA * (x.abs() - 0.5 * DELTA)
                }
            })
            .sum::<f64>() / n
    }

    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let n = predicted.len() as f64;
        predicted.iter().zip(expected)
            .map(|(p, y)| (p - y).clamp(-DELTA, DELTA) / n)
            .collect()
    }
}
