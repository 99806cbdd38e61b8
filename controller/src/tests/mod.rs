
use crate::{
    BoxError, CheckpointStore, Decision, EpochMetrics, EpochObserver, EpochRecord, EpochTrainer,
    EpochValidator, RunSummary,
};

/// Stand-in for model parameters: remembers how many epochs trained it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Weights {
    pub trained_epochs: usize,
}

#[derive(Default)]
pub struct ScriptedTrainer {
    pub fail_at: Option<usize>,
    pub calls: usize,
}

impl EpochTrainer<Weights> for ScriptedTrainer {
    fn train_epoch(&mut self, model: &mut Weights, epoch: usize) -> Result<EpochMetrics, BoxError> {
        self.calls += 1;
        if self.fail_at == Some(epoch) {
            self.fail_at = None;
            return Err("out of device memory".into());
        }
        model.trained_epochs += 1;
        Ok(EpochMetrics::new(1.0 / (epoch + 1) as f64, 0.5))
    }
}

/// Returns scripted `(val_loss, val_metric)` pairs by epoch.
pub struct ScriptedValidator {
    pub script: Vec<(f64, f64)>,
    pub fail_at: Option<usize>,
}

impl ScriptedValidator {
    pub fn metrics(metrics: &[f64]) -> Self {
        Self {
            script: metrics.iter().map(|&m| (1.0 - m, m)).collect(),
            fail_at: None,
        }
    }

    pub fn losses(losses: &[f64]) -> Self {
        Self {
            script: losses.iter().map(|&l| (l, 0.0)).collect(),
            fail_at: None,
        }
    }
}

impl EpochValidator<Weights> for ScriptedValidator {
    fn validate(&mut self, _model: &Weights, epoch: usize) -> Result<EpochMetrics, BoxError> {
        if self.fail_at == Some(epoch) {
            return Err("validation loader crashed".into());
        }
        let (loss, metric) = self.script[epoch];
        Ok(EpochMetrics::new(loss, metric))
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub saved: Option<Weights>,
    pub writes: usize,
    /// Fails the write when the model has been trained this many epochs.
    pub fail_when_trained: Option<usize>,
}

impl CheckpointStore<Weights> for MemoryStore {
    fn save(&mut self, model: &Weights) -> Result<(), BoxError> {
        if self.fail_when_trained == Some(model.trained_epochs) {
            return Err("disk full".into());
        }
        self.writes += 1;
        self.saved = Some(model.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct Recorder {
    pub epochs: Vec<(EpochRecord, Decision)>,
    pub finished: Option<RunSummary>,
}

impl EpochObserver for Recorder {
    fn on_epoch(&mut self, record: &EpochRecord, decision: &Decision) -> Result<(), BoxError> {
        self.epochs.push((*record, *decision));
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), BoxError> {
        self.finished = Some(*summary);
        Ok(())
    }
}

/// Observer whose sink breaks at a given epoch, or when the run finishes.
#[derive(Default)]
pub struct FailingSink {
    pub fail_at: Option<usize>,
    pub fail_on_finish: bool,
    pub written: usize,
}

impl EpochObserver for FailingSink {
    fn on_epoch(&mut self, record: &EpochRecord, _decision: &Decision) -> Result<(), BoxError> {
        if self.fail_at == Some(record.epoch) {
            return Err("broken pipe".into());
        }
        self.written += 1;
        Ok(())
    }

    fn on_finish(&mut self, _summary: &RunSummary) -> Result<(), BoxError> {
        if self.fail_on_finish {
            return Err("flush failed".into());
        }
        Ok(())
    }
}
