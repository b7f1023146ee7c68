//! Engine configuration read from `blocklog.toml`.

use crate::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Engine settings. Every key is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Run block self-validation while materializing.
    pub collect_violations: bool,
    /// Physically delete soft-deleted blocks from storage on save.
    pub purge_deleted_on_save: bool,
    /// Joins texts for `merge_text` and splits them for `split_paragraphs`.
    pub merge_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            collect_violations: true,
            purge_deleted_on_save: true,
            merge_separator: "\n\n".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        let config: Self =
            toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))?;
        if config.merge_separator.is_empty() {
            return Err(EngineError::Config(
                "merge_separator must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    /// Loads configuration from an explicit path.
    /// Falls back to defaults when the file is missing or invalid.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!("No engine config at {:?}, using defaults", path);
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => {
                    info!("Loaded engine config from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse engine config {:?}: {}. Falling back to defaults.",
                        path, e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read engine config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}
