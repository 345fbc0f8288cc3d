use crate::network::Model;
use crate::optim::Optimizer;

/// Adam with L2 weight decay folded into the gradient.
///
/// Moment buffers are created lazily, one per parameter tensor, in the order
/// the model visits them.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    weight_decay: f64,
    beta1_t: f64,
    beta2_t: f64,
    m: Vec<Vec<f64>>,
    v: Vec<Vec<f64>>,
}

impl Adam {
    /// Adam with the usual defaults (β1 = 0.9, β2 = 0.999, ε = 1e-8).
    pub fn new(learning_rate: f64, weight_decay: f64) -> Adam {
        Adam::with_betas(learning_rate, 0.9, 0.999, 1e-8, weight_decay)
    }

    pub fn with_betas(
        learning_rate: f64,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        weight_decay: f64,
    ) -> Adam {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            weight_decay,
            beta1_t: 1.0,
            beta2_t: 1.0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }
}

impl Optimizer for Adam {
    fn step(&mut self, model: &mut dyn Model) {
        let Adam {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            weight_decay: wd,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;
        let bc1 = 1.0 - self.beta1_t;
        let bc2 = 1.0 - self.beta2_t;

        let (ms, vs) = (&mut self.m, &mut self.v);
        let mut slot = 0;
        model.visit_params(&mut |params, grads| {
            if ms.len() <= slot {
                ms.push(vec![0.0; params.len()]);
                vs.push(vec![0.0; params.len()]);
            }
            let (m, v) = (&mut ms[slot], &mut vs[slot]);
            if m.len() != params.len() {
                *m = vec![0.0; params.len()];
                *v = vec![0.0; params.len()];
            }
            for (((p, &g), m), v) in params.iter_mut().zip(grads).zip(m.iter_mut()).zip(v.iter_mut()) {
                let g = g + wd * *p;
                *m = b1 * *m + (1.0 - b1) * g;
                *v = b2 * *v + (1.0 - b2) * g * g;
                let m_hat = *m / bc1;
                let v_hat = *v / bc2;
                *p -= lr * m_hat / (v_hat.sqrt() + eps);
            }
            slot += 1;
        });
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use approx::assert_relative_eq;
    use std::path::Path;

    /// One parameter tensor with a fixed gradient.
    struct Fixed {
        params: Vec<f64>,
        grads: Vec<f64>,
    }

    impl Model for Fixed {
        fn forward(&mut self, _: &[f64]) -> Result<Vec<f64>> {
            Ok(self.params.clone())
        }
        fn backward(&mut self, _: &[f64]) -> Result<()> {
            Ok(())
        }
        fn zero_grad(&mut self) {}
        fn visit_params(&mut self, f: &mut dyn FnMut(&mut [f64], &[f64])) {
            f(&mut self.params, &self.grads);
        }
        fn save_json(&self, _: &Path) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut model = Fixed { params: vec![1.0, -1.0], grads: vec![0.5, -2.0] };
        let mut adam = Adam::new(0.1, 0.0);
        adam.step(&mut model);
        // bias-corrected first step is lr · sign(g)
        assert_relative_eq!(model.params[0], 0.9, epsilon = 1e-6);
        assert_relative_eq!(model.params[1], -0.9, epsilon = 1e-6);
    }

    #[test]
    fn weight_decay_shrinks_parameters_without_gradient() {
        let mut model = Fixed { params: vec![2.0], grads: vec![0.0] };
        let mut adam = Adam::new(0.01, 0.1);
        for _ in 0..10 {
            adam.step(&mut model);
        }
        assert!(model.params[0] < 2.0);
        assert!(model.params[0] > 0.0);
    }

    #[test]
    fn sgd_steps_against_gradient() {
        let mut model = Fixed { params: vec![1.0], grads: vec![2.0] };
        let mut sgd = crate::optim::Sgd::new(0.25);
        sgd.step(&mut model);
        assert_relative_eq!(model.params[0], 0.5);
        sgd.set_learning_rate(0.5);
        assert_relative_eq!(sgd.learning_rate(), 0.5);
    }
}
