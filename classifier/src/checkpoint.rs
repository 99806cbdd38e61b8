use std::fs;
use std::path::PathBuf;

use controller::{BoxError, CheckpointStore};

use crate::model::Model;

/// Single-slot safetensors checkpoint holding the best parameters seen so far.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the slot, so
/// a failed save leaves the previous best intact. A slot only ever holds
/// parameters saved through this store: whatever an earlier run left at the
/// path is removed on creation.
pub struct SafetensorsCheckpoint {
    path: PathBuf,
    saved: bool,
}

impl SafetensorsCheckpoint {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, BoxError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let store = Self { path, saved: false };
        for stale in [store.path.clone(), store.tmp_path()] {
            if stale.is_file() {
                log::info!("Removing stale checkpoint {}", stale.display());
                fs::remove_file(&stale)?;
            }
        }
        Ok(store)
    }

    /// True once a save through this store has succeeded.
    pub fn exists(&self) -> bool {
        self.saved && self.path.exists()
    }

    /// Loads the stored parameters into `model`.
    pub fn restore(&self, model: &mut Model) -> Result<(), BoxError> {
        if !self.exists() {
            return Err(format!("no checkpoint saved at {}", self.path.display()).into());
        }
        model.restore(&self.path)?;
        log::info!("Restored best model from {}", self.path.display());
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl CheckpointStore<Model> for SafetensorsCheckpoint {
    fn save(&mut self, model: &Model) -> Result<(), BoxError> {
        let tmp = self.tmp_path();
        if let Err(e) = model.save(&tmp) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        fs::rename(&tmp, &self.path)?;
        self.saved = true;
        log::debug!("Checkpoint written to {}", self.path.display());
        Ok(())
    }
}
