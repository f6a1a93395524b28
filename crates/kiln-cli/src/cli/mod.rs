//! Command-line interface definition.
//!
//! - `kiln build` - run the pipeline and write the output directory
//! - `kiln check` - load and validate configuration without building

mod commands;
pub mod enums;
mod tests;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command};
pub use enums::*;

/// kiln - an asset pipeline build orchestrator
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "An asset pipeline build orchestrator",
    long_about = "kiln discovers every module reachable from one entry file, runs each through\n\
                  the loader chain of its rule, splits the result into hashed chunks and lets\n\
                  lifecycle plugins emit HTML and static files into the output directory."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
