use std::error::Error;
use std::fmt;

/// Error type produced by the collaborators of a run.
pub type BoxError = Box<dyn Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoEpochs,
    InvalidTolerance(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoEpochs => write!(f, "max_epochs must be at least 1"),
            ConfigError::InvalidTolerance(tolerance) => write!(
                f,
                "tolerance must be a finite non-negative number, got {}",
                tolerance
            ),
        }
    }
}

impl Error for ConfigError {}

/// Failure that aborted a run.
///
/// Trainer, validator and checkpoint failures commit nothing of the failing
/// epoch. An observer failure happens after the epoch was committed.
#[derive(Debug)]
pub enum RunError {
    Trainer { epoch: usize, source: BoxError },
    Validator { epoch: usize, source: BoxError },
    Checkpoint { epoch: usize, source: BoxError },
    Observer { epoch: usize, source: BoxError },
}

impl RunError {
    /// Epoch that was running when the failure happened.
    pub fn epoch(&self) -> usize {
        match self {
            RunError::Trainer { epoch, .. }
            | RunError::Validator { epoch, .. }
            | RunError::Checkpoint { epoch, .. }
            | RunError::Observer { epoch, .. } => *epoch,
        }
    }

    /// Unwraps the collaborator error that caused the failure.
    pub fn into_source(self) -> BoxError {
        match self {
            RunError::Trainer { source, .. }
            | RunError::Validator { source, .. }
            | RunError::Checkpoint { source, .. }
            | RunError::Observer { source, .. } => source,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Trainer { epoch, source } => {
                write!(f, "training failed in epoch {}: {}", epoch + 1, source)
            }
            RunError::Validator { epoch, source } => {
                write!(f, "validation failed in epoch {}: {}", epoch + 1, source)
            }
            RunError::Checkpoint { epoch, source } => {
                write!(f, "saving checkpoint failed in epoch {}: {}", epoch + 1, source)
            }
            RunError::Observer { epoch, source } => {
                write!(f, "reporting epoch {} failed: {}", epoch + 1, source)
            }
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RunError::Trainer { source, .. }
            | RunError::Validator { source, .. }
            | RunError::Checkpoint { source, .. }
            | RunError::Observer { source, .. } => Some(source.as_ref()),
        }
    }
}
