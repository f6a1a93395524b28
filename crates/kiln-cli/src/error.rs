//! Error handling for the kiln CLI.
//!
//! - [`CliError`] is what every command returns
//! - [`ConfigError`] covers loading and validating configuration
//! - [`BuildError`] wraps a failed pipeline run together with its phase
//!
//! Messages carry a `Hint:` line where a fix is known. [`CliError::exit_code`]
//! maps an error to the process exit status: build failures exit with 1,
//! configuration and usage problems with 2.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_template(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .with_path(path)
//!         .context("Failed to read the html template")
//! }
//! ```

mod report;

use std::path::PathBuf;

use kiln_bundler::{BuildFailure, BuildPhase};
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Exit status of a failed build.
pub const EXIT_BUILD_FAILURE: u8 = 1;
/// Exit status of a configuration or usage error.
pub const EXIT_USAGE: u8 = 2;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Custom(String),
}

impl CliError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Build(BuildError::Failed(failure)) if failure.phase == BuildPhase::Idle => {
                EXIT_USAGE
            }
            CliError::Build(_) | CliError::Io(_) => EXIT_BUILD_FAILURE,
            CliError::Config(_)
            | CliError::FileNotFound(_)
            | CliError::Custom(_) => EXIT_USAGE,
        }
    }
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` points at nothing
    #[error("Config file not found: {}\n\nHint: Create a kiln.toml or pass an existing file with --config <path>", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read or parsed, or failed validation
    #[error("{}", describe(.0))]
    Invalid(#[from] kiln_config::ConfigError),

    /// The merged layers do not form a valid configuration
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

// `InvalidValue` already prints its hint.
fn describe(err: &kiln_config::ConfigError) -> String {
    match (err, err.hint()) {
        (kiln_config::ConfigError::InvalidValue { .. }, _) | (_, None) => err.to_string(),
        (_, Some(hint)) => format!("{err}\n\nHint: {hint}"),
    }
}

/// Build process errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The pipeline stopped in `phase`
    #[error("{0}")]
    Failed(#[from] BuildFailure),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_bundler::Error as BundlerError;

    fn failure(phase: BuildPhase) -> BuildFailure {
        BuildFailure {
            phase,
            error: BundlerError::UnresolvedAssetType {
                path: "src/data.yaml".to_string(),
            },
        }
    }

    #[test]
    fn config_not_found_has_hint() {
        let err = ConfigError::NotFound(PathBuf::from("kiln.toml"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("kiln.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn invalid_config_carries_library_hint() {
        let err = ConfigError::from(kiln_config::ConfigError::NotFound);
        assert!(err.to_string().contains("Hint: Create a kiln.toml"));

        let err = ConfigError::from(kiln_config::ConfigError::NoEntry);
        assert_eq!(err.to_string(), "no entry specified");
    }

    #[test]
    fn build_failure_names_phase_and_kind() {
        let err = CliError::from(BuildError::from(failure(BuildPhase::Discovering)));
        let msg = err.to_string();
        assert!(msg.contains("discovering failed"));
        assert!(msg.contains("UnresolvedAssetType"));
    }

    #[test]
    fn exit_codes() {
        let build = CliError::from(BuildError::from(failure(BuildPhase::Transforming)));
        assert_eq!(build.exit_code(), EXIT_BUILD_FAILURE);

        let before_any_phase = CliError::from(BuildError::from(failure(BuildPhase::Idle)));
        assert_eq!(before_any_phase.exit_code(), EXIT_USAGE);

        let config = CliError::from(ConfigError::NotFound(PathBuf::from("kiln.toml")));
        assert_eq!(config.exit_code(), EXIT_USAGE);
    }

    #[test]
    fn result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));
        let err = result.with_path("/test/index.html").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn result_ext_context() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("kiln.toml")));
        let msg = result.context("Failed to load").unwrap_err().to_string();
        assert!(msg.starts_with("Failed to load: "));
    }
}
