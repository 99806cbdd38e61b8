pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod observer;
pub mod tracker;

pub use config::{Mode, RunConfig};
pub use controller::{
    CheckpointStore, Controller, EpochTrainer, EpochValidator, RunOutcome, RunSummary, TrainingRun,
};
pub use error::{BoxError, ConfigError, RunError};
pub use history::{EpochMetrics, EpochRecord, History};
pub use observer::{EpochObserver, LogReporter};
pub use tracker::{Decision, ImprovementTracker};

#[cfg(test)]
mod tests;
