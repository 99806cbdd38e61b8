use std::fmt;

use crate::error::ConfigError;
use crate::history::EpochRecord;

/// Direction in which the monitored criterion has to move to count as an improvement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Track validation metric (accuracy-style).
    Maximize,
    /// Track validation loss.
    Minimize,
}

impl Mode {
    /// Starting value for the best score, beaten by any finite criterion.
    #[inline]
    pub fn worst(self) -> f64 {
        match self {
            Mode::Maximize => f64::NEG_INFINITY,
            Mode::Minimize => f64::INFINITY,
        }
    }

    #[inline]
    pub fn criterion(self, record: &EpochRecord) -> f64 {
        match self {
            Mode::Maximize => record.validation.metric,
            Mode::Minimize => record.validation.loss,
        }
    }

    /// Value the criterion has to strictly beat.
    #[inline]
    pub fn threshold(self, best: f64, tolerance: f64) -> f64 {
        match self {
            Mode::Maximize => best + tolerance,
            Mode::Minimize => best - tolerance,
        }
    }

    // NaN compares false both ways, so it never improves.
    #[inline]
    pub fn beats(self, criterion: f64, threshold: f64) -> bool {
        match self {
            Mode::Maximize => criterion > threshold,
            Mode::Minimize => criterion < threshold,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Maximize => write!(f, "maximize"),
            Mode::Minimize => write!(f, "minimize"),
        }
    }
}

/// Fixed hyperparameters of one training run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunConfig {
    pub max_epochs: usize,
    pub patience: usize,
    pub tolerance: f64,
    pub mode: Mode,
}

impl RunConfig {
    pub fn new(max_epochs: usize, patience: usize, tolerance: f64, mode: Mode) -> Self {
        Self {
            max_epochs,
            patience,
            tolerance,
            mode,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_epochs < 1 {
            return Err(ConfigError::NoEpochs);
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}
