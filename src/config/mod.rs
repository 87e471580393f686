//! Configuration Module
//!
//! Resolves the settings for a run from built-in defaults, an optional
//! project file in the working directory, and command-line overrides.
//!
//! - [`settings`]: the [`Settings`] structure and its YAML loader

pub mod settings;

pub use settings::{ConfigError, Settings, CONFIG_FILE_NAME};
