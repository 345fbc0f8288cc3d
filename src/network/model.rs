use std::path::Path;

use crate::error::Result;

/// A trainable model as seen by the training harness.
///
/// The harness never looks inside: it runs `forward`, hands the loss gradient
/// to `backward`, lets an optimizer walk the parameters with `visit_params`,
/// and clears gradients with `zero_grad`.
pub trait Model {
    /// Runs one sample through the model, caching what `backward` needs.
    fn forward(&mut self, input: &[f64]) -> Result<Vec<f64>>;

    /// Accumulates parameter gradients given `∂L/∂output` of the last forward.
    fn backward(&mut self, grad_output: &[f64]) -> Result<()>;

    fn zero_grad(&mut self);

    /// Calls `f(params, grads)` for every parameter tensor, always in the
    /// same order.
    fn visit_params(&mut self, f: &mut dyn FnMut(&mut [f64], &[f64]));

    /// Switches between training and inference behaviour. No-op by default.
    fn set_training(&mut self, _training: bool) {}

    /// Writes the model to `path`, replacing any existing file.
    fn save_json(&self, path: &Path) -> Result<()>;
}
