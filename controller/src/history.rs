use std::fmt;
use std::io::{self, Write};

use crate::config::Mode;

/// Loss and metric averaged over one pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochMetrics {
    pub loss: f64,
    pub metric: f64,
}

impl EpochMetrics {
    pub fn new(loss: f64, metric: f64) -> Self {
        Self { loss, metric }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpochRecord {
    /// 0-based epoch index.
    pub epoch: usize,
    pub train: EpochMetrics,
    pub validation: EpochMetrics,
}

impl EpochRecord {
    pub const CSV_HEADER: &'static str = "epoch,train_loss,train_metric,val_loss,val_metric";

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(
            writer,
            "{},{},{},{},{}",
            self.epoch,
            self.train.loss,
            self.train.metric,
            self.validation.loss,
            self.validation.metric
        )
    }
}

impl fmt::Display for EpochRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "epoch {}: train loss {:.5}, train metric {:.4} | val loss {:.5}, val metric {:.4}",
            self.epoch + 1,
            self.train.loss,
            self.train.metric,
            self.validation.loss,
            self.validation.metric
        )
    }
}

/// Append-only list of committed epochs.
#[derive(Clone, Debug, Default)]
pub struct History {
    records: Vec<EpochRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: EpochRecord) {
        debug_assert_eq!(record.epoch, self.records.len());
        self.records.push(record);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EpochRecord] {
        &self.records
    }

    pub fn get(&self, epoch: usize) -> Option<&EpochRecord> {
        self.records.get(epoch)
    }

    pub fn last(&self) -> Option<&EpochRecord> {
        self.records.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EpochRecord> {
        self.records.iter()
    }

    pub fn write_csv<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "{}", EpochRecord::CSV_HEADER)?;
        for record in &self.records {
            record.write_csv(writer)?;
        }
        Ok(())
    }

    /// Human readable summary of the run, judged by `mode`.
    pub fn summary(&self, mode: Mode) -> HistorySummary<'_> {
        HistorySummary {
            history: self,
            mode,
        }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a EpochRecord;
    type IntoIter = std::slice::Iter<'a, EpochRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

pub struct HistorySummary<'a> {
    history: &'a History,
    mode: Mode,
}

impl HistorySummary<'_> {
    // Raw best criterion, ignoring tolerance.
    fn best(&self) -> Option<&EpochRecord> {
        let mode = self.mode;
        self.history.iter().fold(None, |best, record| match best {
            Some(best) if !mode.beats(mode.criterion(record), mode.criterion(best)) => Some(best),
            _ if mode.criterion(record).is_nan() => best,
            _ => Some(record),
        })
    }
}

impl fmt::Display for HistorySummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.history.records();

        writeln!(f, "Training History")?;
        writeln!(f, "================")?;
        writeln!(f, "Epochs: {}", records.len())?;

        let Some(last) = records.last() else {
            return Ok(());
        };

        if let Some(best) = self.best() {
            writeln!(
                f,
                "Best val loss {:.5} / val metric {:.4} (epoch {})",
                best.validation.loss,
                best.validation.metric,
                best.epoch + 1
            )?;
        }
        writeln!(
            f,
            "Final val loss {:.5} / val metric {:.4}",
            last.validation.loss, last.validation.metric
        )?;

        // Progression at quarter intervals
        let len = records.len();
        if len >= 4 {
            writeln!(f)?;
            for i in 0..=3 {
                let record = &records[i * (len - 1) / 3];
                writeln!(f, "{}", record)?;
            }
        }

        Ok(())
    }
}
