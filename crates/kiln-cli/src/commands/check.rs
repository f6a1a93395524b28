//! `kiln check`: validate configuration without building.

use kiln_bundler::{BuildFailure, BuildPhase, Orchestrator};
use kiln_config::{Environment, validate_fs};

use crate::cli::CheckArgs;
use crate::commands::utils;
use crate::config::{Overrides, ProjectConfig};
use crate::error::{BuildError, ConfigError, Result};
use crate::ui;

/// Execute the check command.
///
/// Loads and layers the configuration, applies the environment profile,
/// checks that the entry exists and compiles the rule table, loader chains
/// and plugin list exactly as `kiln build` would.
pub fn execute(args: CheckArgs) -> Result<()> {
    let root = utils::project_root(args.cwd.as_deref())?;
    let env = Environment::from(args.env);

    ui::info("Checking configuration...");
    let project = ProjectConfig::load(&root, args.config.as_deref())?;
    let config = project.build_config(env, &Overrides::default())?;
    ui::success(&format!("Loaded {} ({} profile)", project.source(), env));

    validate_fs(config.options(), config.root()).map_err(ConfigError::from)?;
    ui::success(&format!("Entry {} exists", config.options().entry.display()));

    Orchestrator::new(&config)
        .map_err(|error| BuildFailure {
            phase: BuildPhase::Idle,
            error,
        })
        .map_err(BuildError::from)?;

    let options = config.options();
    let plugins: Vec<&str> = options
        .plugins
        .iter()
        .filter(|plugin| plugin.enabled)
        .map(|plugin| plugin.name.as_str())
        .collect();
    ui::success(&format!("{} rules compiled", options.rules.len()));
    if plugins.is_empty() {
        ui::warning("No plugins enabled: no HTML document will be written");
    } else {
        ui::success(&format!("Plugins: {}", plugins.join(", ")));
    }
    ui::info(&format!(
        "minify: {}, source maps: {}, output: {}",
        options.minify(),
        options.source_maps(),
        config.output_dir().display()
    ));

    ui::success("All checks passed!");
    Ok(())
}
