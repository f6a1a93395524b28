//! kiln CLI - asset pipeline builds from the command line.
//!
//! The binary is a thin layer over `kiln-bundler`:
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`config`] - layered configuration loading (figment)
//! - [`commands`] - `build` and `check`
//! - [`error`] - CLI error types, hints and miette reporting
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages, build progress and the summary table
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::{cli::BuildArgs, commands, logger};
//!
//! logger::init_logger(false, false, false);
//! commands::build_execute(BuildArgs::default()).unwrap();
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{BuildError, CliError, ConfigError, Result, ResultExt};
