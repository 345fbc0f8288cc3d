use crate::error::{check_len, Error, Result};

/// One `(input, label)` pair.
pub type Sample = (Vec<f64>, Vec<f64>);

/// Indexed source of samples.
///
/// `get` must return the same sample for the same index for at least the
/// duration of an epoch.
pub trait Dataset {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<Sample>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Samples held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    inputs: Vec<Vec<f64>>,
    labels: Vec<Vec<f64>>,
}

impl InMemoryDataset {
    pub fn new(inputs: Vec<Vec<f64>>, labels: Vec<Vec<f64>>) -> Result<InMemoryDataset> {
        check_len(inputs.len(), labels.len())?;
        Ok(InMemoryDataset { inputs, labels })
    }

    pub fn from_samples(samples: impl IntoIterator<Item = Sample>) -> InMemoryDataset {
        let (inputs, labels) = samples.into_iter().unzip();
        InMemoryDataset { inputs, labels }
    }

    pub fn inputs(&self) -> &[Vec<f64>] {
        &self.inputs
    }

    pub fn labels(&self) -> &[Vec<f64>] {
        &self.labels
    }
}

impl Dataset for InMemoryDataset {
    fn len(&self) -> usize {
        self.inputs.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        match (self.inputs.get(index), self.labels.get(index)) {
            (Some(x), Some(y)) => Ok((x.clone(), y.clone())),
            _ => Err(Error::IndexOutOfBounds { index, len: self.len() }),
        }
    }
}

impl<D: Dataset + ?Sized> Dataset for Box<D> {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        (**self).get(index)
    }
}
