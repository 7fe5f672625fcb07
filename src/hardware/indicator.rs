/// Warning indicator output
use log::{info, trace};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IndicatorError;

/// Binary warning output. Setting the same level twice is harmless.
pub trait Indicator {
    fn set(&mut self, active: bool) -> Result<(), IndicatorError>;
}

/// Drives an LED or GPIO through a sysfs-style value file (`1` / `0`)
#[derive(Debug, Clone)]
pub struct FileIndicator {
    path: PathBuf,
    level: Option<bool>,
}

impl FileIndicator {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            level: None,
        }
    }
}

impl Indicator for FileIndicator {
    fn set(&mut self, active: bool) -> Result<(), IndicatorError> {
        if self.level == Some(active) {
            return Ok(());
        }

        let value = if active { "1" } else { "0" };
        fs::write(&self.path, value).map_err(|source| IndicatorError::Io {
            path: self.path.clone(),
            source,
        })?;

        trace!("Wrote {} to {}", value, self.path.display());
        self.level = Some(active);
        Ok(())
    }
}

/// Stand-in used when no output is wired: reports level changes in the log
#[derive(Debug, Clone, Default)]
pub struct LogIndicator {
    level: bool,
}

impl Indicator for LogIndicator {
    fn set(&mut self, active: bool) -> Result<(), IndicatorError> {
        if self.level != active {
            info!("Indicator {}", if active { "ON" } else { "OFF" });
            self.level = active;
        }
        Ok(())
    }
}
