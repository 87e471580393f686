//! Run Settings
//!
//! Settings are read from an optional `envstrap.yaml` placed next to the
//! project's manifest. Every key is optional.
//!
//! # Example YAML Format
//!
//! ```yaml
//! python: "3.11"
//! manifest: requirements-dev.txt
//! manager: /opt/miniconda3/bin/conda
//! channels:
//!   - conda-forge
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

/// Name of the optional project settings file.
pub const CONFIG_FILE_NAME: &str = "envstrap.yaml";

/// Interpreter version pinned into newly created environments.
pub const DEFAULT_PYTHON_VERSION: &str = "3.8";

/// Dependency manifest looked up in the working directory.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Errors raised while loading the project settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Settings controlling how environments are created and populated.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Explicit conda binary; auto-resolved when absent. Relative paths with
    /// a directory part are relative to the project directory.
    #[serde(default)]
    pub manager: Option<PathBuf>,

    /// Python version for `conda create`
    #[serde(rename = "python", default = "default_python_version")]
    pub python_version: String,

    /// File name of the dependency manifest
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Extra channels passed to `conda create`
    #[serde(default)]
    pub channels: Vec<String>,
}

fn default_python_version() -> String {
    DEFAULT_PYTHON_VERSION.to_string()
}

fn default_manifest() -> String {
    DEFAULT_MANIFEST.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manager: None,
            python_version: default_python_version(),
            manifest: default_manifest(),
            channels: Vec::new(),
        }
    }
}

impl Settings {
    /// Parses settings from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as a map
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Loads `envstrap.yaml` from `dir`, falling back to defaults when the file
    /// does not exist.
    pub fn load(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);

        if !path.is_file() {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;

        let mut settings =
            Self::from_yaml(&text).map_err(|source| ConfigError::Parse { path: path.clone(), source })?;

        // A bare program name is still looked up on PATH
        if let Some(manager) = settings.manager.take() {
            settings.manager = Some(if manager.components().count() > 1 {
                dir.join(manager)
            } else {
                manager
            });
        }

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Full path of the manifest file inside `dir`.
    pub fn manifest_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.manifest)
    }
}
