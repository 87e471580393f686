//! Environment Bootstrapper
//!
//! Ties the environment provider to the user's terminal:
//! - Derives the environment name from the working directory
//! - Creates the environment when it does not exist yet
//! - Otherwise lets the user pick one of the existing environments
//! - Installs the dependency manifest into new environments
//! - Prints the activation command (a child process cannot activate
//!   an environment in its parent shell)

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::Settings;
use crate::environment::{parse_env_list, EnvironmentProvider};

use super::selection::resolve_selection;

/// Fatal errors of a bootstrap run.
///
/// Failures of the environment manager itself are not fatal; they are
/// logged and the run carries on.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("cannot derive an environment name from '{}'", .0.display())]
    NoEnvironmentName(PathBuf),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Which branch a run took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The directory's environment was missing and has been created.
    Created(String),
    /// The environment existed and the user picked this one.
    Selected(String),
    /// The environment existed but the typed selection was unusable.
    InvalidSelection,
}

/// Returns the environment name for a working directory: its last component.
pub fn environment_name(dir: &Path) -> Result<String, BootstrapError> {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| BootstrapError::NoEnvironmentName(dir.to_path_buf()))
}

/// Creates or selects the environment belonging to a project directory.
///
/// # Example
///
/// ```rust,no_run
/// use std::io;
/// use envstrap::{Bootstrapper, CondaProvider, Settings};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let dir = std::env::current_dir()?;
///     let bootstrapper = Bootstrapper::new(CondaProvider::new(), Settings::default());
///     bootstrapper.run(&dir, io::stdin().lock(), io::stdout().lock())?;
///     Ok(())
/// }
/// ```
pub struct Bootstrapper<P> {
    provider: P,
    settings: Settings,
}

impl<P: EnvironmentProvider> Bootstrapper<P> {
    /// Creates a bootstrapper driving `provider` with `settings`.
    pub fn new(provider: P, settings: Settings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Lists environment names known to the manager, in reported order.
    ///
    /// A manager that is missing or fails yields an empty list; the cause
    /// is only logged.
    pub fn list_environments(&self) -> Vec<String> {
        match self.provider.list_output() {
            Ok(output) => {
                let envs = parse_env_list(&output);
                debug!("Found {} environments: {:?}", envs.len(), envs);
                envs
            }
            Err(e) => {
                warn!("Could not list environments: {}", e);
                Vec::new()
            }
        }
    }

    /// Creates `name` with the pinned interpreter and then installs the
    /// manifest from `dir`. Creation failures do not stop the install step.
    pub fn create_environment<W: Write>(
        &self,
        name: &str,
        dir: &Path,
        out: &mut W,
    ) -> io::Result<()> {
        writeln!(out, "Creating conda environment: {}", name)?;
        out.flush()?;

        if let Err(e) = self.provider.create(
            name,
            &self.settings.python_version,
            &self.settings.channels,
        ) {
            error!("Failed to create environment '{}': {}", name, e);
        }

        self.install_manifest(name, dir, out)
    }

    /// Prints the command the user has to run to activate `name`.
    pub fn print_activation_hint<W: Write>(&self, name: &str, out: &mut W) -> io::Result<()> {
        writeln!(out, "To activate the conda environment, run:")?;
        writeln!(out, "{}", self.provider.activation_command(name))
    }

    /// Installs the manifest from `dir` into `name` with pip, if present.
    pub fn install_manifest<W: Write>(&self, name: &str, dir: &Path, out: &mut W) -> io::Result<()> {
        let manifest = self.settings.manifest_path(dir);

        if !manifest.is_file() {
            writeln!(
                out,
                "No {} found in the current directory.",
                self.settings.manifest
            )?;
            return Ok(());
        }

        writeln!(out, "Installing packages from {}", self.settings.manifest)?;
        out.flush()?;

        let command = vec![
            "pip".to_string(),
            "install".to_string(),
            "-r".to_string(),
            manifest.display().to_string(),
        ];

        if let Err(e) = self.provider.run_in(name, &command) {
            error!("Failed to install {} into '{}': {}", manifest.display(), name, e);
        }

        Ok(())
    }

    /// Runs the full bootstrap for the project directory `dir`.
    ///
    /// Reads at most one line from `input`, and only when the directory's
    /// environment already exists.
    pub fn run<R: BufRead, W: Write>(
        &self,
        dir: &Path,
        mut input: R,
        mut out: W,
    ) -> Result<RunOutcome, BootstrapError> {
        let name = environment_name(dir)?;
        info!("Environment name: {}", name);

        let envs = self.list_environments();

        let outcome = if envs.iter().any(|env| *env == name) {
            writeln!(out, "Environment '{}' already exists.", name)?;
            writeln!(out, "Available conda environments:")?;
            for (idx, env) in envs.iter().enumerate() {
                writeln!(out, "{}. {}", idx + 1, env)?;
            }
            write!(out, "Select the number of the environment to activate: ")?;
            out.flush()?;

            // Raw bytes, so undecodable input is rejected as a selection
            let mut answer = Vec::new();
            input.read_until(b'\n', &mut answer)?;

            match resolve_selection(&envs, &String::from_utf8_lossy(&answer)) {
                Ok(selected) => {
                    self.print_activation_hint(selected, &mut out)?;
                    RunOutcome::Selected(selected.to_string())
                }
                Err(e) => {
                    debug!("Rejected selection: {}", e);
                    writeln!(out, "Invalid selection.")?;
                    RunOutcome::InvalidSelection
                }
            }
        } else {
            self.create_environment(&name, dir, &mut out)?;
            self.print_activation_hint(&name, &mut out)?;
            RunOutcome::Created(name.clone())
        };

        writeln!(out)?;
        writeln!(out, "Setup complete.")?;
        self.print_activation_hint(&name, &mut out)?;
        writeln!(out, "You can now run Python scripts in this environment.")?;
        out.flush()?;

        Ok(outcome)
    }
}
