//! envstrap - Directory-Keyed Conda Environments
//!
//! Creates a conda environment named after the current project directory,
//! installs the project's `requirements.txt` into it, and tells the user
//! how to activate it. When the environment already exists, the user picks
//! one of the existing environments instead.
//!
//! # Architecture
//!
//! The library is organized into three modules:
//!
//! - [`environment`]: Provider trait and the conda subprocess implementation
//! - [`bootstrap`]: The list / create / select / install flow
//! - [`config`]: Defaults and the optional `envstrap.yaml` project file
//!
//! # Example
//!
//! ```rust,no_run
//! use std::io;
//! use envstrap::{Bootstrapper, CondaProvider, Settings};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dir = std::env::current_dir()?;
//!     let settings = Settings::load(&dir)?;
//!
//!     let bootstrapper = Bootstrapper::new(CondaProvider::new(), settings);
//!     bootstrapper.run(&dir, io::stdin().lock(), io::stdout().lock())?;
//!     Ok(())
//! }
//! ```

pub mod bootstrap;
pub mod config;
pub mod environment;

// Re-export commonly used types
pub use bootstrap::{Bootstrapper, RunOutcome};
pub use config::Settings;
pub use environment::{CondaProvider, EnvironmentProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "envstrap";
