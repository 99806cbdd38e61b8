use crate::controller::RunSummary;
use crate::error::BoxError;
use crate::history::EpochRecord;
use crate::tracker::Decision;

/// Receives every committed epoch, e.g. for console output or scalar logs.
///
/// An error aborts the run and reaches the caller of `Controller::run`.
pub trait EpochObserver {
    fn on_epoch(&mut self, record: &EpochRecord, decision: &Decision) -> Result<(), BoxError>;

    fn on_finish(&mut self, _summary: &RunSummary) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<T: EpochObserver + ?Sized> EpochObserver for &mut T {
    fn on_epoch(&mut self, record: &EpochRecord, decision: &Decision) -> Result<(), BoxError> {
        (**self).on_epoch(record, decision)
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), BoxError> {
        (**self).on_finish(summary)
    }
}

/// Writes the per-epoch report through the `log` facade.
#[derive(Debug, Default)]
pub struct LogReporter {
    slot: Option<String>,
}

impl LogReporter {
    /// Names the checkpoint slot in "saved" messages.
    pub fn with_slot(slot: impl Into<String>) -> Self {
        Self {
            slot: Some(slot.into()),
        }
    }
}

impl EpochObserver for LogReporter {
    fn on_epoch(&mut self, record: &EpochRecord, decision: &Decision) -> Result<(), BoxError> {
        log::info!("{}", record);

        match decision {
            Decision::Improved {
                criterion,
                previous,
            } => match &self.slot {
                Some(slot) => log::info!(
                    "Improved {:.5} -> {:.5}, saved best model to {}",
                    previous,
                    criterion,
                    slot
                ),
                None => log::info!("Improved {:.5} -> {:.5}", previous, criterion),
            },
            Decision::NotImproved {
                criterion,
                threshold,
                epochs_without_improvement,
            } => log::info!(
                "No improvement for {} epochs ({:.5} vs threshold {:.5})",
                epochs_without_improvement,
                criterion,
                threshold
            ),
        }
        Ok(())
    }

    fn on_finish(&mut self, summary: &RunSummary) -> Result<(), BoxError> {
        log::info!("{}", summary);
        Ok(())
    }
}
