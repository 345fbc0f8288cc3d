use crate::network::Model;

/// Updates a model's parameters from its accumulated gradients.
///
/// Optimizers that keep per-parameter state rely on `Model::visit_params`
/// walking tensors in the same order on every call.
pub trait Optimizer {
    fn step(&mut self, model: &mut dyn Model);

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, learning_rate: f64);
}
