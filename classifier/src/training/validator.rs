use controller::{BoxError, EpochMetrics, EpochValidator};

use crate::evaluation::evaluate;
use crate::model::Model;
use crate::samples::Samples;

/// Scores the model on the held-out validation rows.
pub struct Validator<'a> {
    samples: &'a Samples,
    indices: Vec<usize>,
    batch_size: usize,
}

impl<'a> Validator<'a> {
    pub fn new(samples: &'a Samples, indices: Vec<usize>, batch_size: usize) -> Self {
        Self {
            samples,
            indices,
            batch_size: batch_size.max(1),
        }
    }
}

impl EpochValidator<Model> for Validator<'_> {
    fn validate(&mut self, model: &Model, _epoch: usize) -> Result<EpochMetrics, BoxError> {
        if self.indices.is_empty() {
            return Err("no validation samples".into());
        }
        Ok(evaluate(model, self.samples, &self.indices, self.batch_size)?)
    }
}
