//! Environment Manager Integration
//!
//! Defines the capability interface the bootstrapper needs from an
//! environment manager, plus the conda-backed implementation.
//!
//! - [`EnvironmentProvider`]: list/create/run operations
//! - [`conda`]: subprocess implementation driving the `conda` CLI

pub mod conda;

use std::io;

use thiserror::Error;

pub use conda::{parse_env_list, resolve_conda_binary, CondaProvider, CONDA_PATH};

/// Failure of a single call into the environment manager.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The manager binary could not be spawned (missing, not executable).
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The manager ran but exited unsuccessfully.
    #[error("'{command}' exited with status {}", display_code(.code))]
    Failed { command: String, code: Option<i32> },
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

/// Operations the bootstrapper performs against an environment manager.
///
/// Each call blocks until the underlying tool has finished.
pub trait EnvironmentProvider {
    /// Returns the raw text of the manager's environment listing.
    fn list_output(&self) -> Result<String, ProviderError>;

    /// Creates `name` with the given interpreter version.
    fn create(
        &self,
        name: &str,
        python_version: &str,
        channels: &[String],
    ) -> Result<(), ProviderError>;

    /// Runs `command` inside the environment `name`.
    fn run_in(&self, name: &str, command: &[String]) -> Result<(), ProviderError>;

    /// Shell command the user has to type to activate `name`.
    fn activation_command(&self, name: &str) -> String;
}
