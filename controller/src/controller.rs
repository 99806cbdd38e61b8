use std::fmt;

use crate::config::{Mode, RunConfig};
use crate::error::{BoxError, ConfigError, RunError};
use crate::history::{EpochMetrics, EpochRecord, History};
use crate::observer::EpochObserver;
use crate::tracker::ImprovementTracker;

/// Runs one pass over the training data, updating the model.
pub trait EpochTrainer<M> {
    fn train_epoch(&mut self, model: &mut M, epoch: usize) -> Result<EpochMetrics, BoxError>;
}

/// Runs one pass over held-out data without touching the parameters.
pub trait EpochValidator<M> {
    fn validate(&mut self, model: &M, epoch: usize) -> Result<EpochMetrics, BoxError>;
}

/// Persists the model into a single slot, replacing whatever was there.
pub trait CheckpointStore<M> {
    fn save(&mut self, model: &M) -> Result<(), BoxError>;
}

impl<M, T: EpochTrainer<M> + ?Sized> EpochTrainer<M> for &mut T {
    fn train_epoch(&mut self, model: &mut M, epoch: usize) -> Result<EpochMetrics, BoxError> {
        (**self).train_epoch(model, epoch)
    }
}

impl<M, V: EpochValidator<M> + ?Sized> EpochValidator<M> for &mut V {
    fn validate(&mut self, model: &M, epoch: usize) -> Result<EpochMetrics, BoxError> {
        (**self).validate(model, epoch)
    }
}

impl<M, S: CheckpointStore<M> + ?Sized> CheckpointStore<M> for &mut S {
    fn save(&mut self, model: &M) -> Result<(), BoxError> {
        (**self).save(model)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// All `max_epochs` epochs were executed.
    Exhausted,
    /// Patience ran out before `max_epochs`.
    TerminatedEarly,
}

/// State of one training run.
#[derive(Clone, Debug)]
pub struct TrainingRun {
    config: RunConfig,
    tracker: ImprovementTracker,
    history: History,
    terminated_early: bool,
}

impl TrainingRun {
    fn new(config: RunConfig) -> Self {
        Self {
            tracker: ImprovementTracker::new(&config),
            config,
            history: History::new(),
            terminated_early: false,
        }
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn best_score(&self) -> f64 {
        self.tracker.best_score()
    }

    pub fn best_epoch(&self) -> Option<usize> {
        self.tracker.best_epoch()
    }

    pub fn epochs_without_improvement(&self) -> usize {
        self.tracker.epochs_without_improvement()
    }

    pub fn terminated_early(&self) -> bool {
        self.terminated_early
    }

    pub fn is_finished(&self) -> bool {
        self.terminated_early || self.history.len() >= self.config.max_epochs
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            outcome: if self.terminated_early {
                RunOutcome::TerminatedEarly
            } else {
                RunOutcome::Exhausted
            },
            epochs: self.history.len(),
            max_epochs: self.config.max_epochs,
            mode: self.config.mode,
            best_score: self.tracker.best_score(),
            best_epoch: self.tracker.best_epoch(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub epochs: usize,
    pub max_epochs: usize,
    pub mode: Mode,
    pub best_score: f64,
    pub best_epoch: Option<usize>,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            RunOutcome::TerminatedEarly => write!(
                f,
                "Ran out of patience after {} of {} epochs",
                self.epochs, self.max_epochs
            )?,
            RunOutcome::Exhausted => write!(f, "Finished all {} epochs", self.epochs)?,
        }

        let criterion = match self.mode {
            Mode::Maximize => "val metric",
            Mode::Minimize => "val loss",
        };
        match self.best_epoch {
            Some(epoch) => write!(
                f,
                ", best {} {:.5} at epoch {}",
                criterion,
                self.best_score,
                epoch + 1
            ),
            None => write!(f, ", no epoch improved on the initial {}", criterion),
        }
    }
}

/// Drives training epochs and decides after each one whether to checkpoint,
/// keep going or stop.
///
/// The epoch is committed to the history only after its side effects
/// succeeded: a failing trainer, validator or checkpoint write leaves the
/// state as it was after the previous epoch. Observers see the epoch after it
/// was committed, so an observer error leaves that epoch in the history.
pub struct Controller<'a> {
    run: TrainingRun,
    observers: Vec<Box<dyn EpochObserver + 'a>>,
}

impl<'a> Controller<'a> {
    pub fn new(config: RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            run: TrainingRun::new(config),
            observers: Vec::new(),
        })
    }

    pub fn observe(mut self, observer: impl EpochObserver + 'a) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub fn state(&self) -> &TrainingRun {
        &self.run
    }

    pub fn into_state(self) -> TrainingRun {
        self.run
    }

    /// Runs epochs until patience or `max_epochs` runs out.
    ///
    /// Picks up after the last committed epoch, so calling it again after an
    /// error continues the same run. Calling it on a finished run only returns
    /// the summary.
    pub fn run<M, T, V, S>(
        &mut self,
        model: &mut M,
        mut trainer: T,
        mut validator: V,
        mut store: S,
    ) -> Result<RunSummary, RunError>
    where
        T: EpochTrainer<M>,
        V: EpochValidator<M>,
        S: CheckpointStore<M>,
    {
        if self.run.is_finished() {
            return Ok(self.run.summary());
        }

        let max_epochs = self.run.config.max_epochs;
        let mode = self.run.config.mode;

        for epoch in self.run.history.len()..max_epochs {
            let train = trainer
                .train_epoch(model, epoch)
                .map_err(|source| RunError::Trainer { epoch, source })?;
            let validation = validator
                .validate(model, epoch)
                .map_err(|source| RunError::Validator { epoch, source })?;

            let record = EpochRecord {
                epoch,
                train,
                validation,
            };
            let decision = self.run.tracker.assess(mode.criterion(&record));

            if decision.improved() {
                store
                    .save(model)
                    .map_err(|source| RunError::Checkpoint { epoch, source })?;
            }

            self.run.tracker.commit(epoch, &decision);
            self.run.history.push(record);

            // Running out of patience on the last epoch is just the end of the run
            let has_remaining = epoch + 1 < max_epochs;
            if has_remaining && self.run.tracker.should_stop() {
                self.run.terminated_early = true;
            }

            for observer in self.observers.iter_mut() {
                observer
                    .on_epoch(&record, &decision)
                    .map_err(|source| RunError::Observer { epoch, source })?;
            }

            if self.run.terminated_early {
                log::info!("Early stopping after {} epochs", epoch + 1);
                break;
            }
        }

        let summary = self.run.summary();
        let last_epoch = summary.epochs.saturating_sub(1);
        for observer in self.observers.iter_mut() {
            observer
                .on_finish(&summary)
                .map_err(|source| RunError::Observer {
                    epoch: last_epoch,
                    source,
                })?;
        }

        Ok(summary)
    }
}
