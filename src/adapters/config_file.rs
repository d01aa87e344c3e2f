//! JSON file configuration store.
//!
//! Implements [`ConfigPort`] on top of a single pretty-printed JSON file.
//! Values are validated before they are written, and again after they
//! are read, so a hand-edited file cannot smuggle in an unusable setting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::LinkConfig;

pub struct JsonConfigFile {
    path: PathBuf,
}

impl JsonConfigFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored config, or the defaults if the file does not exist.
    pub fn load_or_default(&self) -> Result<LinkConfig, ConfigError> {
        match self.load() {
            Err(ConfigError::NotFound) => {
                info!("config: {} not found, using defaults", self.path.display());
                Ok(LinkConfig::default())
            }
            other => other,
        }
    }
}

impl ConfigPort for JsonConfigFile {
    fn load(&self) -> Result<LinkConfig, ConfigError> {
        let text = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::NotFound,
            _ => {
                warn!("config: reading {} failed: {}", self.path.display(), e);
                ConfigError::IoError
            }
        })?;
        let config: LinkConfig = serde_json::from_str(&text).map_err(|e| {
            warn!("config: {} is not valid: {}", self.path.display(), e);
            ConfigError::Corrupted
        })?;
        config.validate()?;
        info!("config: loaded {}", self.path.display());
        Ok(config)
    }

    fn save(&self, config: &LinkConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let text = serde_json::to_string_pretty(config).map_err(|_| ConfigError::Corrupted)?;
        fs::write(&self.path, text).map_err(|e| {
            warn!("config: writing {} failed: {}", self.path.display(), e);
            ConfigError::IoError
        })?;
        info!("config: saved {}", self.path.display());
        Ok(())
    }
}
