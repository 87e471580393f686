//! Bootstrap Module
//!
//! The interactive flow that turns a project directory into a ready
//! conda environment.
//!
//! - [`bootstrapper`]: [`Bootstrapper`] and the run entry point
//! - [`selection`]: parsing of the numbered environment prompt

pub mod bootstrapper;
pub mod selection;

pub use bootstrapper::{environment_name, BootstrapError, Bootstrapper, RunOutcome};
pub use selection::{resolve_selection, SelectionError};
