use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::cli::enums::EnvArg;

/// Available kiln subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project
    ///
    /// Discovers modules from the configured entry, transforms them, splits
    /// them into chunks, runs the lifecycle plugins and writes the output
    /// directory. A failed build leaves the previous output untouched.
    Build(BuildArgs),

    /// Validate configuration without building
    ///
    /// Loads the layered configuration, applies the environment profile and
    /// compiles the rule table, loader chains and plugin list.
    Check(CheckArgs),
}

/// Arguments for the build command
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Build environment
    ///
    /// Selects the `[profiles.<env>]` overrides. Development keeps code
    /// readable and writes source maps; production minifies.
    #[arg(short, long, value_enum, default_value = "development")]
    pub env: EnvArg,

    /// Output directory, overriding `build.output_dir`
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Configuration file (default: kiln.toml, then the `kiln` field of package.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Remove the output directory's contents before writing
    #[arg(long)]
    pub clean: bool,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Environment whose profile is validated
    #[arg(short, long, value_enum, default_value = "development")]
    pub env: EnvArg,

    /// Configuration file (default: kiln.toml, then the `kiln` field of package.json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
