use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActivationFunction {
    Sigmoid,
    ReLU,
    Identity,
    Tanh,
    LeakyReLU { alpha: f64 },
    /// Vector-valued; normalizes the whole layer output.
    Softmax,
}

impl ActivationFunction {
    /// Applies the activation to a full pre-activation vector `z`.
    pub fn apply(&self, z: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => softmax(z),
            _ => z.iter().map(|&x| self.scalar(x)).collect(),
        }
    }

    /// Maps `∂L/∂a` to `∂L/∂z`, given the cached pre-activation `z` and
    /// output `a` of the layer.
    pub fn backprop(&self, z: &[f64], a: &[f64], grad_a: &[f64]) -> Vec<f64> {
        match self {
            ActivationFunction::Softmax => {
                // J = diag(a) - a aᵀ, so J·g = a ⊙ (g - ⟨g, a⟩)
                let dot: f64 = grad_a.iter().zip(a).map(|(g, ai)| g * ai).sum();
                a.iter().zip(grad_a).map(|(ai, g)| ai * (g - dot)).collect()
            }
            _ => z
                .iter()
                .zip(grad_a)
                .map(|(&x, g)| g * self.scalar_derivative(x))
                .collect(),
        }
    }

    fn scalar(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::ReLU => x.max(0.0),
            ActivationFunction::Identity | ActivationFunction::Softmax => x,
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { x } else { alpha * x },
        }
    }

    fn scalar_derivative(&self, x: f64) -> f64 {
        match *self {
            ActivationFunction::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            ActivationFunction::ReLU => if x > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity | ActivationFunction::Softmax => 1.0,
            ActivationFunction::Tanh => 1.0 - x.tanh().powi(2),
            ActivationFunction::LeakyReLU { alpha } => if x > 0.0 { 1.0 } else { alpha },
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Numerically stable softmax (shifted by the max logit).
fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn softmax_sums_to_one() {
        let a = ActivationFunction::Softmax.apply(&[1.0, 2.0, 3.0, 1000.0]);
        assert_relative_eq!(a.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(a.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn softmax_backprop_matches_finite_difference() {
        let act = ActivationFunction::Softmax;
        let z = [0.3, -1.2, 0.8];
        let g = [0.5, -1.0, 2.0];
        let a = act.apply(&z);
        let analytic = act.backprop(&z, &a, &g);

        let h = 1e-6;
        for i in 0..z.len() {
            let mut zp = z;
            zp[i] += h;
            let mut zm = z;
            zm[i] -= h;
            let fp: f64 = act.apply(&zp).iter().zip(&g).map(|(a, g)| a * g).sum();
            let fm: f64 = act.apply(&zm).iter().zip(&g).map(|(a, g)| a * g).sum();
            assert_relative_eq!(analytic[i], (fp - fm) / (2.0 * h), epsilon = 1e-6);
        }
    }

    #[test]
    fn relu_gates_gradient() {
        let act = ActivationFunction::ReLU;
        let z = [-1.0, 2.0];
        let a = act.apply(&z);
        assert_eq!(a, vec![0.0, 2.0]);
        assert_eq!(act.backprop(&z, &a, &[1.0, 1.0]), vec![0.0, 1.0]);
    }
}
