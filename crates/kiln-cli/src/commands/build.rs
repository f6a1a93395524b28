//! `kiln build`.

use std::sync::Arc;

use kiln_bundler::{BuildFailure, BuildPhase, Orchestrator};
use kiln_config::{Environment, validate_fs};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config::{Overrides, ProjectConfig};
use crate::error::{BuildError, ConfigError, Result};
use crate::ui;

/// Execute the build command.
///
/// 1. Load configuration (defaults < file < `KILN_*` env < profile < flags)
/// 2. Check that the entry exists
/// 3. Run the orchestrator with a progress spinner
/// 4. Print the summary table
///
/// A pipeline failure is returned as [`BuildError::Failed`] carrying the
/// phase it happened in; the output directory is left as it was.
pub fn execute(args: BuildArgs) -> Result<()> {
    let root = utils::project_root(args.cwd.as_deref())?;
    let env = Environment::from(args.env);

    let project = ProjectConfig::load(&root, args.config.as_deref())?;
    let config = project.build_config(
        env,
        &Overrides {
            out_dir: args.out_dir.clone(),
        },
    )?;
    validate_fs(config.options(), config.root()).map_err(ConfigError::from)?;

    ui::info(&format!(
        "Building {} for {} (config: {})",
        config.options().entry.display(),
        env,
        project.source()
    ));

    let progress = Arc::new(ui::BuildProgress::new(ui::show_progress()));
    let mut orchestrator = Orchestrator::new(&config)
        .map_err(|error| BuildFailure {
            phase: BuildPhase::Idle,
            error,
        })
        .map_err(BuildError::from)?
        .with_reporter(progress.clone())
        .with_clean(args.clean);

    match orchestrator.run() {
        Ok(result) => {
            progress.finish(&format!("Built {} modules", result.graph.modules().len()));
            if project.show_summary() {
                ui::print_build_summary(&result.files, result.duration);
            }
            ui::success(&format!(
                "Build completed in {} ({})",
                ui::format_duration(result.duration),
                result.output_dir.display()
            ));
            Ok(())
        }
        Err(failure) => {
            progress.fail(&format!("Build failed while {}", failure.phase));
            ui::error(&format!(
                "Build failed in phase '{}' ({})",
                failure.phase,
                failure.error.kind()
            ));
            Err(BuildError::from(failure).into())
        }
    }
}
