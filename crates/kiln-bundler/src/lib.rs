//! # kiln-bundler
//!
//! The build orchestrator: discovers modules from one entry file, runs each
//! through the loader chain of its classifier rule, groups the results into
//! chunks and hands the chunk graph to lifecycle plugins before writing the
//! output directory.
//!
//! ```text
//! Idle ─▶ Discovering ─▶ Transforming ─▶ Splitting ─▶ PostProcessing ─▶ Done
//!              │               │              │               │
//!              └───────────────┴──────┬───────┴───────────────┘
//!                                     ▼
//!                                   Failed
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use kiln_bundler::{BuildConfig, Orchestrator};
//! use kiln_config::{Environment, KilnConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BuildConfig::from_kiln_config(".", Environment::Production, KilnConfig::default())?;
//! let result = Orchestrator::new(&config)?.run()?;
//! for file in &result.files {
//!     println!("{} ({} bytes)", file.path, file.size);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod classifier;
pub mod config;
pub mod discovery;
pub mod link;
pub mod loaders;
pub mod orchestrator;
pub mod output;
pub mod plugins;
pub mod render;
pub mod resolver;
pub mod scanner;
pub mod splitting;
pub mod transform;

use std::path::PathBuf;

pub use kiln_graph::*;

pub use cache::{CacheError, TransformCache};
pub use classifier::RuleTable;
pub use config::BuildConfig;
pub use loaders::{Content, EmittedFile, Loader, LoaderChain, LoaderContext, LoaderRegistry};
pub use orchestrator::{
    BuildFailure, BuildPhase, BuildResult, NoopReporter, Orchestrator, ProgressReporter, build,
};
pub use output::OutputFile;
pub use plugins::{BuildPlugin, PluginRegistry};
pub use resolver::{FsResolver, Resolution, Resolver};
pub use transform::{ModuleOutput, TransformedModule};

/// Error types for kiln-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No classifier rule matches the file.
    #[error("no rule matches '{path}'")]
    UnresolvedAssetType { path: String },

    /// A loader step failed; the chain was aborted.
    #[error("step '{step}' failed for '{module}': {cause}")]
    TransformError {
        module: String,
        step: String,
        cause: String,
    },

    /// The static import graph contains a cycle.
    #[error("dependency cycle: {chain}")]
    CyclicDependency { chain: DependencyChain },

    /// A lifecycle plugin failed.
    #[error("plugin '{plugin}' failed: {cause}")]
    PluginError { plugin: String, cause: String },

    /// The external library manifest does not exist.
    #[error("external manifest not found: {}", .path.display())]
    MissingExternalManifest { path: PathBuf },

    /// A relative or aliased import points at nothing.
    #[error("cannot resolve '{specifier}' from '{importer}'")]
    ModuleNotFound { specifier: String, importer: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Result type alias for kiln-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Wrap any failure raised inside a plugin.
    pub fn plugin(plugin: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Error::PluginError {
            plugin: plugin.into(),
            cause: cause.to_string(),
        }
    }

    pub fn transform(
        module: impl Into<String>,
        step: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Error::TransformError {
            module: module.into(),
            step: step.into(),
            cause: cause.to_string(),
        }
    }

    /// Short name of the error kind, printed next to the failing phase.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnresolvedAssetType { .. } => "UnresolvedAssetType",
            Error::TransformError { .. } => "TransformError",
            Error::CyclicDependency { .. } => "CyclicDependency",
            Error::PluginError { .. } => "PluginError",
            Error::MissingExternalManifest { .. } => "MissingExternalManifest",
            Error::ModuleNotFound { .. } => "ModuleNotFound",
            Error::Config(_) => "ConfigError",
            Error::InvalidOutputPath(_) => "InvalidOutputPath",
            Error::WriteFailure(_) => "WriteFailure",
            Error::Io(_) | Error::Runtime(_) => "IoError",
            Error::Graph(_) => "GraphError",
        }
    }
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::UnresolvedAssetType { .. } => "KILN::UNRESOLVED_ASSET_TYPE",
            Error::TransformError { .. } => "KILN::TRANSFORM_ERROR",
            Error::CyclicDependency { .. } => "KILN::CYCLIC_DEPENDENCY",
            Error::PluginError { .. } => "KILN::PLUGIN_ERROR",
            Error::MissingExternalManifest { .. } => "KILN::MISSING_EXTERNAL_MANIFEST",
            Error::ModuleNotFound { .. } => "KILN::MODULE_NOT_FOUND",
            Error::Config(_) => "KILN::INVALID_CONFIG",
            Error::InvalidOutputPath(_) => "KILN::INVALID_OUTPUT_PATH",
            Error::WriteFailure(_) => "KILN::WRITE_FAILURE",
            Error::Io(_) | Error::Runtime(_) => "KILN::IO_ERROR",
            Error::Graph(_) => "KILN::GRAPH_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::UnresolvedAssetType { path } => Some(Box::new(format!(
                "Add a rule to 'build.rules' whose 'test' pattern matches '{}'",
                path
            ))),
            Error::TransformError { step, .. } => Some(Box::new(format!(
                "Check the input of the '{}' step and its options in the rule table",
                step
            ))),
            Error::CyclicDependency { .. } => Some(Box::new(
                "Break the cycle, e.g. by moving shared code into a separate module or loading one side with import()",
            )),
            Error::MissingExternalManifest { path } => Some(Box::new(format!(
                "Build the external library bundle first so that '{}' exists",
                path.display()
            ))),
            Error::ModuleNotFound { specifier, .. } => Some(Box::new(format!(
                "Check that '{}' exists; extensions are probed from 'build.resolve.extensions'",
                specifier
            ))),
            Error::Config(msg) => Some(Box::new(format!(
                "Check your configuration file for errors.\nError: {}",
                msg
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{}' is invalid. Ensure it's within the output directory and doesn't contain '..' components.",
                path
            ))),
            Error::WriteFailure(_) => Some(Box::new("Check disk space and permissions")),
            _ => None,
        }
    }
}
