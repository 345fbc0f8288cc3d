/// Categorical cross-entropy over a probability vector (Softmax output).
pub struct CrossEntropyLoss;

const EPS: f64 = 1e-12;

impl CrossEntropyLoss {
    /// -Σ y·ln(p + ε)
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected)
            .map(|(p, y)| -y * (p + EPS).ln())
            .sum()
    }

    /// ∂L/∂p = -y / (p + ε). Composed with the Softmax Jacobian this reduces
    /// to `p - y` for targets that sum to one.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected)
            .map(|(p, y)| -y / (p + EPS))
            .collect()
    }
}
