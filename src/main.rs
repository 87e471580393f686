//! envstrap CLI Entry Point
//!
//! Creates or selects the conda environment named after the current
//! directory.
//!
//! # Usage
//!
//! ```bash
//! # Bootstrap the environment for the current directory
//! envstrap
//!
//! # Pin a different interpreter for new environments
//! envstrap --python 3.11
//!
//! # Bootstrap another project directory
//! envstrap --dir /path/to/project
//! ```

use std::env;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use colored::Colorize;
use log::{debug, info};

use envstrap::{Bootstrapper, CondaProvider, RunOutcome, Settings, APP_NAME, VERSION};

/// Command-line configuration parsed from arguments.
#[derive(Debug, Default)]
struct Config {
    working_dir: Option<PathBuf>,
    python_version: Option<String>,
    manifest: Option<String>,
    manager: Option<PathBuf>,
    channels: Vec<String>,
    verbose: bool,
}

impl Config {
    /// Applies command-line overrides on top of file/default settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(ref version) = self.python_version {
            settings.python_version = version.clone();
        }
        if let Some(ref manifest) = self.manifest {
            settings.manifest = manifest.clone();
        }
        if let Some(ref manager) = self.manager {
            settings.manager = Some(manager.clone());
        }
        if !self.channels.is_empty() {
            settings.channels = self.channels.clone();
        }
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!("Directory-keyed conda environments");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: envstrap [OPTIONS]");
    println!();
    println!("Creates a conda environment named after the current directory,");
    println!("or lets you pick an existing one when it already exists.");
    println!();
    println!("Options:");
    println!("  --dir PATH          Project directory (default: current directory)");
    println!(
        "  --python VERSION    Python version for new environments (default: {})",
        envstrap::config::settings::DEFAULT_PYTHON_VERSION
    );
    println!(
        "  --manifest FILE     Dependency manifest to install (default: {})",
        envstrap::config::settings::DEFAULT_MANIFEST
    );
    println!("  --manager PATH      conda binary to invoke");
    println!("  --channel NAME      Extra channel for conda create (repeatable)");
    println!("  --verbose           Enable debug logging");
    println!("  --help              Show this help message");
    println!("  --version           Show version information");
    println!();
    println!(
        "Settings may also be placed in {} inside the project directory.",
        envstrap::config::CONFIG_FILE_NAME
    );
}

/// Returns the value following option `args[*i]`, advancing the cursor.
fn option_value(args: &[String], i: &mut usize, what: &str) -> Result<String, String> {
    let option = &args[*i];
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| format!("{} requires {} argument", option, what))
}

/// Parses command-line arguments into a Config struct.
fn parse_arguments(args: &[String]) -> Result<Config, String> {
    let mut config = Config::default();
    let mut i = 1; // Skip program name

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--verbose" | "-v" => {
                config.verbose = true;
            }
            "--dir" => {
                config.working_dir = Some(PathBuf::from(option_value(args, &mut i, "a path")?));
            }
            "--python" => {
                config.python_version = Some(option_value(args, &mut i, "a version")?);
            }
            "--manifest" => {
                config.manifest = Some(option_value(args, &mut i, "a file name")?);
            }
            "--manager" => {
                config.manager = Some(PathBuf::from(option_value(args, &mut i, "a path")?));
            }
            "--channel" => {
                config.channels.push(option_value(args, &mut i, "a channel name")?);
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                return Err(format!("Unexpected argument: {}", arg));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Resolves and validates the project directory.
fn resolve_working_directory(
    working_dir: Option<PathBuf>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let Some(dir) = working_dir else {
        return Ok(env::current_dir()?);
    };

    if !dir.exists() {
        return Err(format!("Working directory does not exist: {}", dir.display()).into());
    }

    if !dir.is_dir() {
        return Err(format!("Path is not a directory: {}", dir.display()).into());
    }

    // Relative paths like `.` have no file name to derive the environment from
    Ok(dir.canonicalize()?)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let config = parse_arguments(&args).map_err(|e| {
        eprintln!("{} {}", "Error:".red().bold(), e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(config.verbose);

    if config.verbose {
        print_banner();
    }

    let dir = resolve_working_directory(config.working_dir.clone())?;
    info!("Working directory: {}", dir.display());

    // Defaults, then project file, then command line
    let mut settings = Settings::load(&dir)?;
    config.apply(&mut settings);
    debug!("Settings: {:?}", settings);

    let provider = match settings.manager {
        Some(ref manager) => CondaProvider::with_binary(manager),
        None => CondaProvider::new(),
    };
    info!("Using conda binary: {}", provider.binary().display());

    let bootstrapper = Bootstrapper::new(provider, settings);
    let outcome = bootstrapper.run(&dir, io::stdin().lock(), io::stdout().lock())?;
    debug!("Run outcome: {:?}", outcome);

    if outcome == RunOutcome::InvalidSelection {
        info!("No environment was selected");
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
