use crate::network::Model;
use crate::optim::Optimizer;

/// Plain stochastic gradient descent: `θ ← θ - lr · g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }
}

impl Optimizer for Sgd {
    fn step(&mut self, model: &mut dyn Model) {
        let lr = self.learning_rate;
        model.visit_params(&mut |params, grads| {
            params.iter_mut().zip(grads).for_each(|(p, g)| *p -= lr * g);
        });
    }

    fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }
}
