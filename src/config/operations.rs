//! Config discovery, loading and validation.

use super::model::{CONFIG_FILE_NAME, GlobalConfig};
use crate::error::{PromptyError, Result};
use crate::fs::{read_file, read_file_async};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

impl GlobalConfig {
    /// Load config from a `prompty.json` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::from_json(&read_file(path)?).map_err(|e| at_path(e, path))
    }

    /// Load config from a `prompty.json` file without blocking.
    pub async fn load_async<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::from_json(&read_file_async(path).await?).map_err(|e| at_path(e, path))
    }

    /// Parse config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: GlobalConfig =
            serde_json::from_str(json).map_err(|e| PromptyError::Parse {
                path: PathBuf::new(),
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - connection names must not be empty
    /// - every connection must be a JSON object
    pub fn validate(&self) -> Result<()> {
        for (name, connection) in &self.connections {
            if name.trim().is_empty() {
                return Err(PromptyError::definition(
                    "configuration",
                    "connection name cannot be empty",
                ));
            }
            if !connection.is_object() {
                return Err(PromptyError::definition(
                    "configuration",
                    format!("connection '{}' must be an object", name),
                ));
            }
        }
        Ok(())
    }

    /// Find the nearest `prompty.json` in `dir` or one of its ancestors.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        dir.ancestors()
            .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// [`GlobalConfig::discover`] without blocking.
    pub async fn discover_async(dir: &Path) -> Option<PathBuf> {
        for ancestor in dir.ancestors() {
            let candidate = ancestor.join(CONFIG_FILE_NAME);
            if tokio::fs::metadata(&candidate)
                .await
                .is_ok_and(|meta| meta.is_file())
            {
                return Some(candidate);
            }
        }
        None
    }
}

fn at_path(err: PromptyError, path: &Path) -> PromptyError {
    match err {
        PromptyError::Parse { message, .. } => PromptyError::Parse {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    }
}

/// The named connection profile that applies to definitions in `dir`.
///
/// Returns an empty mapping when no `prompty.json` is found or it does not
/// define `connection`. The profile is returned unnormalized.
pub fn load_global_config(dir: &Path, connection: &str) -> Result<Map<String, Value>> {
    match GlobalConfig::discover(dir) {
        Some(path) => {
            tracing::debug!(path = %path.display(), connection, "loading global configuration");
            Ok(GlobalConfig::load(&path)?.connection(connection))
        }
        None => Ok(Map::new()),
    }
}

/// [`load_global_config`] without blocking.
pub async fn load_global_config_async(dir: &Path, connection: &str) -> Result<Map<String, Value>> {
    match GlobalConfig::discover_async(dir).await {
        Some(path) => {
            tracing::debug!(path = %path.display(), connection, "loading global configuration");
            Ok(GlobalConfig::load_async(&path).await?.connection(connection))
        }
        None => Ok(Map::new()),
    }
}
