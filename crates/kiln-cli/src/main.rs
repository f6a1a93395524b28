//! kiln - asset pipeline build orchestrator.
//!
//! Parses arguments, sets up logging and colors, dispatches the command and
//! turns failures into miette reports and process exit codes.

use std::process::ExitCode;

use clap::Parser;
use kiln_cli::{cli, commands, error, logger, ui};

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args),
        cli::Command::Check(check_args) => commands::check_execute(check_args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", error::cli_error_to_miette(err));
            ExitCode::from(code)
        }
    }
}
