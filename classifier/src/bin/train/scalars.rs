use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use controller::{BoxError, Decision, EpochObserver, EpochRecord, RunSummary};

/// Appends one CSV line per committed epoch to `<dir>/<timestamp>/scalars.csv`.
pub struct ScalarLog<W: Write = BufWriter<File>> {
    path: PathBuf,
    writer: W,
}

impl ScalarLog {
    pub fn create(runs_dir: impl AsRef<Path>) -> io::Result<Self> {
        let timestamp = Local::now().format("%Y-%m-%d-%H%M%S");
        let dir = runs_dir.as_ref().join(timestamp.to_string());
        fs::create_dir_all(&dir)?;

        let path = dir.join("scalars.csv");
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", EpochRecord::CSV_HEADER)?;
        writer.flush()?;

        log::info!("Logging scalars to {}", path.display());
        Ok(Self { path, writer })
    }
}

impl<W: Write> ScalarLog<W> {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<W: Write> EpochObserver for ScalarLog<W> {
    fn on_epoch(&mut self, record: &EpochRecord, _decision: &Decision) -> Result<(), BoxError> {
        record.write_csv(&mut self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    fn on_finish(&mut self, _summary: &RunSummary) -> Result<(), BoxError> {
        self.writer.flush()?;
        Ok(())
    }
}
