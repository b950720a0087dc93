//! Configuration persistence port and JSON file implementation.

use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::types::Config;

/// Persistence port for the configuration record.
///
/// The session manager and setup flow never touch a file directly; they go
/// through this port.
pub trait ConfigStore: Send + Sync {
    /// Load the record, or `None` when it does not exist yet.
    fn load(&self) -> Result<Option<Config>, ConfigError>;

    /// Persist the record.
    fn save(&self, config: &Config) -> Result<(), ConfigError>;

    /// Human-readable location of the record, for prompts and diagnostics.
    fn describe(&self) -> String;
}

/// `ConfigStore` backed by a pretty-printed JSON file.
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    /// Store backed by an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for the named record: `<name>.json` in the working directory.
    pub fn for_name(name: &str) -> Self {
        Self {
            path: std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(format!("{name}.json")),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Option<Config>, ConfigError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let config: Config = serde_json::from_str(&data)?;
        Ok(Some(config))
    }

    fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        std::fs::write(&self.path, json)?;
        tracing::debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
