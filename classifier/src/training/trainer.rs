use candle_nn::loss::cross_entropy;
use controller::{BoxError, EpochMetrics, EpochTrainer};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::evaluation::correct_predictions;
use crate::model::Model;
use crate::optimizer::Optim;
use crate::samples::Samples;
use crate::training::progress::TrainingProgressBar;

/// Mini-batch gradient descent over the training rows.
///
/// Rows are reshuffled every epoch from a seeded generator, and the learning
/// rate decays once per completed epoch.
pub struct Trainer<'a> {
    samples: &'a Samples,
    indices: Vec<usize>,
    optimizer: Optim,
    batch_size: usize,
    lr_decay: f64,
    rng: StdRng,
    show_progress: bool,
}

impl<'a> Trainer<'a> {
    pub fn new(
        samples: &'a Samples,
        indices: Vec<usize>,
        optimizer: Optim,
        batch_size: usize,
        seed: u64,
    ) -> Self {
        Self {
            samples,
            indices,
            optimizer,
            batch_size: batch_size.max(1),
            lr_decay: 1.0,
            rng: StdRng::seed_from_u64(seed),
            show_progress: true,
        }
    }

    pub fn with_lr_decay(mut self, lr_decay: f64) -> Self {
        self.lr_decay = lr_decay;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }
}

impl EpochTrainer<Model> for Trainer<'_> {
    fn train_epoch(&mut self, model: &mut Model, epoch: usize) -> Result<EpochMetrics, BoxError> {
        if self.indices.is_empty() {
            return Err("no training samples".into());
        }

        self.indices.shuffle(&mut self.rng);

        let num_batches = self.indices.len().div_ceil(self.batch_size);
        let progress = TrainingProgressBar::new(num_batches, self.show_progress)?;
        log::debug!(
            "Epoch {}: {} batches at lr {:.6}",
            epoch + 1,
            num_batches,
            self.optimizer.learning_rate()
        );

        let mut total_loss = 0.0;
        let mut correct = 0usize;
        let mut seen = 0usize;

        for batch in self
            .samples
            .batches(&self.indices, self.batch_size, model.device())
        {
            let (x, y) = batch?;
            let n = y.dim(0)?;

            let logits = model.logits(&x)?;
            let loss = cross_entropy(&logits, &y)?;
            self.optimizer.backward_step(&loss)?;

            total_loss += loss.to_vec0::<f32>()? as f64 * n as f64;
            correct += correct_predictions(&logits, &y)?;
            seen += n;

            progress.update(total_loss / seen as f64, correct as f64 / seen as f64);
        }

        let metrics = EpochMetrics::new(total_loss / seen as f64, correct as f64 / seen as f64);
        progress.finish(metrics.loss, metrics.metric);

        self.optimizer.decay(self.lr_decay);

        Ok(metrics)
    }
}
