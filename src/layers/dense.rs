use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::activation::ActivationFunction;
use crate::error::{check_len, Result};
use crate::math::Matrix;

/// Fully connected layer: `a = σ(x · W + b)`.
///
/// Gradients accumulate across `backward` calls until `zero_grad`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    pub activator: ActivationFunction,

    #[serde(skip)]
    weights_grad: Option<Matrix>,
    #[serde(skip)]
    biases_grad: Vec<f64>,
    #[serde(skip)]
    cache: Option<Cache>,
}

#[derive(Debug, Clone)]
struct Cache {
    input: Vec<f64>,
    pre_activation: Vec<f64>,
    activation: Vec<f64>,
}

impl Layer {
    /// Builds a layer with weights picked to suit its activation
    /// (He for ReLU-family, Xavier otherwise) and zero biases.
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        let weights = match activation {
            ActivationFunction::ReLU | ActivationFunction::LeakyReLU { .. } => {
                Matrix::he(input_size, size, rng)
            }
            _ => Matrix::xavier(input_size, size, rng),
        };
        Layer::from_parts(weights, vec![0.0; size], activation)
    }

    /// Builds a layer from explicit parameters. `weights` is `input_size × size`.
    pub fn from_parts(weights: Matrix, biases: Vec<f64>, activation: ActivationFunction) -> Layer {
        Layer {
            size: weights.cols,
            input_size: weights.rows,
            weights,
            biases,
            activator: activation,
            weights_grad: None,
            biases_grad: Vec::new(),
            cache: None,
        }
    }

    /// Forward pass; caches what `backward` needs.
    pub fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        check_len(self.input_size, input.len())?;
        check_len(self.size, self.biases.len())?;
        let mut z = self.weights.left_mul(input)?;
        z.iter_mut().zip(&self.biases).for_each(|(zj, b)| *zj += b);
        let a = self.activator.apply(&z);
        self.cache = Some(Cache {
            input: input.to_vec(),
            pre_activation: z,
            activation: a.clone(),
        });
        Ok(a)
    }

    /// Accumulates parameter gradients from `∂L/∂a` and returns `∂L/∂x`.
    ///
    /// Must follow a `forward` call; without one there is nothing to
    /// differentiate and an `InvalidData` error is returned.
    pub fn backward(&mut self, grad_output: &[f64]) -> Result<Vec<f64>> {
        check_len(self.size, grad_output.len())?;
        let cache = self.cache.as_ref().ok_or_else(|| {
            crate::Error::InvalidData("backward called before forward".into())
        })?;
        let delta = self
            .activator
            .backprop(&cache.pre_activation, &cache.activation, grad_output);

        let w_grad = self
            .weights_grad
            .get_or_insert_with(|| Matrix::zeros(self.input_size, self.size));
        w_grad.add_outer(&cache.input, &delta)?;

        if self.biases_grad.len() != self.size {
            self.biases_grad = vec![0.0; self.size];
        }
        self.biases_grad.iter_mut().zip(&delta).for_each(|(g, d)| *g += d);

        self.weights.right_mul(&delta)
    }

    pub fn zero_grad(&mut self) {
        if let Some(g) = self.weights_grad.as_mut() {
            g.fill(0.0);
        }
        self.biases_grad.iter_mut().for_each(|g| *g = 0.0);
    }

    /// Calls `f(params, grads)` for the weights, then the biases.
    /// Parameters with no accumulated gradient are skipped.
    pub fn visit_params(&mut self, f: &mut dyn FnMut(&mut [f64], &[f64])) {
        if let Some(g) = self.weights_grad.as_ref() {
            f(self.weights.as_mut_slice(), g.as_slice());
        }
        if self.biases_grad.len() == self.biases.len() {
            f(&mut self.biases, &self.biases_grad);
        }
    }

    pub fn param_count(&self) -> usize {
        self.weights.as_slice().len() + self.biases.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn identity_layer() -> Layer {
        // x · [[1, 2], [3, 4]] + [0.5, -0.5]
        let w = Matrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        Layer::from_parts(w, vec![0.5, -0.5], ActivationFunction::Identity)
    }

    #[test]
    fn forward_computes_affine_map() {
        let mut layer = identity_layer();
        assert_eq!(layer.forward(&[1.0, 1.0]).unwrap(), vec![4.5, 5.5]);
    }

    #[test]
    fn forward_rejects_wrong_input_len() {
        let mut layer = identity_layer();
        assert!(matches!(
            layer.forward(&[1.0, 2.0, 3.0]),
            Err(crate::Error::ShapeMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn backward_accumulates_until_zeroed() {
        let mut layer = identity_layer();
        layer.forward(&[1.0, 2.0]).unwrap();
        let grad_in = layer.backward(&[1.0, 0.0]).unwrap();
        // W · [1, 0] = first column
        assert_eq!(grad_in, vec![1.0, 3.0]);
        layer.backward(&[1.0, 0.0]).unwrap();

        let mut seen = Vec::new();
        layer.visit_params(&mut |_, g| seen.push(g.to_vec()));
        assert_eq!(seen[0], vec![2.0, 0.0, 4.0, 0.0]);
        assert_eq!(seen[1], vec![2.0, 0.0]);

        layer.zero_grad();
        let mut total = 0.0;
        layer.visit_params(&mut |_, g| total += g.iter().sum::<f64>());
        assert_relative_eq!(total, 0.0);
    }

    #[test]
    fn backward_without_forward_fails() {
        let mut layer = identity_layer();
        assert!(layer.backward(&[1.0, 1.0]).is_err());
    }
}
