use crate::device::Device;

/// Errors raised while building datasets, running models or training.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("shape mismatch: expected {expected} values, got {got}")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("index {index} out of bounds for dataset of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("device {0} is not available in this build")]
    DeviceUnavailable(Device),

    #[error("learning-rate finder failed: {0}")]
    LrFinder(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `ShapeMismatch` unless `got == expected`.
pub(crate) fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ShapeMismatch { expected, got });
    }
    Ok(())
}
