//! Conda Environment Management
//!
//! Drives the `conda` CLI as a subprocess to list, create and run
//! commands inside environments.
//!
//! # Binary Resolution Priority
//!
//! The conda binary is resolved in the following order:
//! 1. Explicit path passed to [`CondaProvider::with_binary`]
//! 2. `CONDA_EXE` environment variable (exported by conda's shell hook)
//! 3. System PATH via `which conda`
//! 4. Bare `conda`, left for the OS to resolve at spawn time

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, error, info, warn};
use once_cell::sync::Lazy;

use super::{EnvironmentProvider, ProviderError};

/// Number of header lines printed by `conda env list` before the first environment.
const LIST_HEADER_LINES: usize = 2;

/// Lazily-resolved path to the conda binary.
pub static CONDA_PATH: Lazy<PathBuf> =
    Lazy::new(|| resolve_conda_binary(std::env::var("CONDA_EXE").ok(), which_conda));

/// Picks the conda binary from `CONDA_EXE`, then the system PATH lookup,
/// then the bare program name.
///
/// `system_path` is only consulted when `conda_exe` is unset or points to a
/// missing file.
pub fn resolve_conda_binary<F>(conda_exe: Option<String>, system_path: F) -> PathBuf
where
    F: FnOnce() -> Option<PathBuf>,
{
    // Priority 1: conda's own hook exports the binary it was activated from
    if let Some(exe) = conda_exe.filter(|exe| !exe.is_empty()) {
        let path = PathBuf::from(exe);
        if path.exists() {
            info!("Using conda from CONDA_EXE: {}", path.display());
            return path;
        }
        warn!("CONDA_EXE points to a missing file: {}", path.display());
    }

    // Priority 2: System PATH
    if let Some(system_path) = system_path() {
        info!("Using system conda: {}", system_path.display());
        return system_path;
    }

    // Not found; spawning will fail later and be reported then
    warn!("Conda binary not found");
    warn!("  Searched: CONDA_EXE");
    warn!("  Searched: system PATH");
    warn!("  Install from: https://docs.conda.io/");

    PathBuf::from("conda")
}

/// Asks `which` for conda on the system PATH.
fn which_conda() -> Option<PathBuf> {
    let output = Command::new("which").arg("conda").output().ok()?;
    if !output.status.success() {
        return None;
    }

    let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if path_str.is_empty() {
        None
    } else {
        Some(PathBuf::from(path_str))
    }
}

/// Extracts environment names from `conda env list` output.
///
/// The first two lines are a header and are skipped whatever they contain.
/// Every remaining non-blank line contributes its first whitespace-delimited
/// token, which for unnamed environments is their prefix path.
pub fn parse_env_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(LIST_HEADER_LINES)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// [`EnvironmentProvider`] backed by the conda command-line tool.
#[derive(Debug, Clone)]
pub struct CondaProvider {
    binary: PathBuf,
}

impl CondaProvider {
    /// Creates a provider using the auto-resolved [`CONDA_PATH`].
    pub fn new() -> Self {
        Self {
            binary: (*CONDA_PATH).clone(),
        }
    }

    /// Creates a provider that invokes the given binary.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Path of the conda binary this provider invokes.
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        cmd
    }

    fn describe(&self, args: &[String]) -> String {
        let mut text = self.binary.display().to_string();
        for arg in args {
            text.push(' ');
            text.push_str(arg);
        }
        text
    }

    fn launch_error(&self, source: std::io::Error) -> ProviderError {
        ProviderError::Launch {
            program: self.binary.display().to_string(),
            source,
        }
    }

    /// Runs conda with inherited stdio so the user sees its progress.
    fn run_attached(&self, args: &[String]) -> Result<(), ProviderError> {
        let described = self.describe(args);
        debug!("Running: {}", described);

        let status = self
            .command(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|e| self.launch_error(e))?;

        if status.success() {
            Ok(())
        } else {
            error!("'{}' failed with exit code: {:?}", described, status.code());
            Err(ProviderError::Failed {
                command: described,
                code: status.code(),
            })
        }
    }
}

impl Default for CondaProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentProvider for CondaProvider {
    fn list_output(&self) -> Result<String, ProviderError> {
        let args = list_args();
        let described = self.describe(&args);
        debug!("Running: {}", described);

        let output = self
            .command(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| self.launch_error(e))?;

        if !output.status.success() {
            return Err(ProviderError::Failed {
                command: described,
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn create(
        &self,
        name: &str,
        python_version: &str,
        channels: &[String],
    ) -> Result<(), ProviderError> {
        info!(
            "Creating environment '{}' with python={} (channels: {:?})",
            name, python_version, channels
        );
        self.run_attached(&create_args(name, python_version, channels))
    }

    fn run_in(&self, name: &str, command: &[String]) -> Result<(), ProviderError> {
        self.run_attached(&run_args(name, command))
    }

    fn activation_command(&self, name: &str) -> String {
        format!("conda activate {}", name)
    }
}

fn list_args() -> Vec<String> {
    vec!["env".to_string(), "list".to_string()]
}

fn create_args(name: &str, python_version: &str, channels: &[String]) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        "--name".to_string(),
        name.to_string(),
        format!("python={}", python_version),
    ];
    for channel in channels {
        args.push("-c".to_string());
        args.push(channel.clone());
    }
    args.push("-y".to_string());
    args
}

fn run_args(name: &str, command: &[String]) -> Vec<String> {
    let mut args = vec!["run".to_string(), "-n".to_string(), name.to_string()];
    args.extend(command.iter().cloned());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_LIST: &str = "\
# conda environments:
#
base                  *  /opt/conda
analysis                 /opt/conda/envs/analysis
webapp                   /opt/conda/envs/webapp
";

    #[test]
    fn test_parse_env_list_sample() {
        let envs = parse_env_list(SAMPLE_LIST);
        assert_eq!(envs, vec!["base", "analysis", "webapp"]);
    }

    #[test]
    fn test_parse_env_list_skips_header_regardless_of_content() {
        let output = "alpha /envs/alpha\nbeta /envs/beta\ngamma /envs/gamma\n";
        assert_eq!(parse_env_list(output), vec!["gamma"]);
    }

    #[test]
    fn test_parse_env_list_blank_lines_ignored() {
        let output = "# conda environments:\n#\n\nfirst /a\n   \nsecond /b\n\n";
        assert_eq!(parse_env_list(output), vec!["first", "second"]);
    }

    #[test]
    fn test_parse_env_list_header_only() {
        assert!(parse_env_list("# conda environments:\n#\n").is_empty());
        assert!(parse_env_list("").is_empty());
    }

    #[test]
    fn test_parse_env_list_unnamed_prefix() {
        let output = "# conda environments:\n#\n/home/user/project/.env\nnamed /x\n";
        assert_eq!(
            parse_env_list(output),
            vec!["/home/user/project/.env", "named"]
        );
    }

    #[test]
    fn test_resolve_conda_binary_prefers_conda_exe() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let exe = file.path().display().to_string();

        let resolved = resolve_conda_binary(Some(exe), || -> Option<PathBuf> {
            panic!("PATH lookup must not run when CONDA_EXE exists")
        });
        assert_eq!(resolved, file.path());
    }

    #[test]
    fn test_resolve_conda_binary_missing_conda_exe_uses_path() {
        let resolved = resolve_conda_binary(
            Some("/nonexistent/envstrap-test/conda".to_string()),
            || Some(PathBuf::from("/usr/bin/conda")),
        );
        assert_eq!(resolved, PathBuf::from("/usr/bin/conda"));
    }

    #[test]
    fn test_resolve_conda_binary_unset_uses_path() {
        let resolved = resolve_conda_binary(None, || Some(PathBuf::from("/opt/conda/bin/conda")));
        assert_eq!(resolved, PathBuf::from("/opt/conda/bin/conda"));
    }

    #[test]
    fn test_resolve_conda_binary_falls_back_to_bare_name() {
        assert_eq!(resolve_conda_binary(None, || None), PathBuf::from("conda"));
        assert_eq!(
            resolve_conda_binary(Some("/nonexistent/envstrap-test/conda".to_string()), || None),
            PathBuf::from("conda")
        );
        assert_eq!(
            resolve_conda_binary(Some(String::new()), || None),
            PathBuf::from("conda")
        );
    }

    #[test]
    fn test_create_args_pins_python() {
        let args = create_args("myproj", "3.8", &[]);
        assert_eq!(args, vec!["create", "--name", "myproj", "python=3.8", "-y"]);
    }

    #[test]
    fn test_create_args_with_channels() {
        let channels = vec!["conda-forge".to_string(), "bioconda".to_string()];
        let args = create_args("myproj", "3.11", &channels);
        assert_eq!(
            args,
            vec![
                "create",
                "--name",
                "myproj",
                "python=3.11",
                "-c",
                "conda-forge",
                "-c",
                "bioconda",
                "-y"
            ]
        );
    }

    #[test]
    fn test_run_args() {
        let command = vec![
            "pip".to_string(),
            "install".to_string(),
            "-r".to_string(),
            "requirements.txt".to_string(),
        ];
        let args = run_args("myproj", &command);
        assert_eq!(
            args,
            vec!["run", "-n", "myproj", "pip", "install", "-r", "requirements.txt"]
        );
    }

    #[test]
    fn test_activation_command() {
        let provider = CondaProvider::with_binary("/opt/conda/bin/conda");
        assert_eq!(provider.activation_command("myproj"), "conda activate myproj");
    }

    #[test]
    fn test_with_binary() {
        let provider = CondaProvider::with_binary("/usr/local/bin/conda");
        assert_eq!(provider.binary(), Path::new("/usr/local/bin/conda"));
    }

    #[test]
    fn test_describe_joins_arguments() {
        let provider = CondaProvider::with_binary("conda");
        assert_eq!(provider.describe(&list_args()), "conda env list");
    }

    #[test]
    fn test_missing_binary_is_launch_error() {
        let provider = CondaProvider::with_binary("/nonexistent/envstrap-test/conda");
        let err = provider.list_output().unwrap_err();
        assert!(matches!(err, ProviderError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_failed_error() {
        // `false` ignores its arguments and exits with status 1
        let provider = CondaProvider::with_binary("false");
        let err = provider.list_output().unwrap_err();
        assert!(matches!(err, ProviderError::Failed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_list_output_captures_stdout() {
        // `echo env list` prints its arguments back
        let provider = CondaProvider::with_binary("echo");
        let output = provider.list_output().unwrap();
        assert_eq!(output.trim(), "env list");
    }
}
