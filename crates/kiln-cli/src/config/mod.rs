//! Configuration for CLI commands.
//!
//! [`ProjectConfig::load`] layers, from lowest to highest priority:
//!
//! 1. built-in defaults
//! 2. the project file (`kiln.toml`, the `kiln` field of `package.json`, or `--config`)
//! 3. `KILN_`-prefixed environment variables, `__` separating levels
//!    (`KILN_BUILD__MINIFY=true`, `KILN_SETTINGS__TITLE=Shop`)
//!
//! The environment profile is applied on top of the merged result, and
//! command-line flags ([`Overrides`]) last.

mod loading;
#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use kiln_bundler::BuildConfig;
use kiln_config::{Environment, KilnConfig};

pub use loading::ENV_PREFIX;

/// Loaded configuration of one project.
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Project root; relative config paths resolve against it.
    pub root: PathBuf,
    /// File the configuration came from, if any.
    pub file: Option<PathBuf>,
    pub config: KilnConfig,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub out_dir: Option<PathBuf>,
}

impl ProjectConfig {
    /// Materialize `env` and apply the command-line overrides.
    pub fn build_config(&self, env: Environment, overrides: &Overrides) -> crate::Result<BuildConfig> {
        let mut config = self
            .config
            .clone()
            .for_environment(env)
            .map_err(crate::ConfigError::from)?;

        if let Some(out_dir) = &overrides.out_dir {
            config.build.output_dir = out_dir.clone();
        }

        let title = config.settings.title.clone().unwrap_or_default();
        Ok(BuildConfig::new(&self.root, env, config.build).with_title(title))
    }

    /// Whether the size table is printed after a build.
    pub fn show_summary(&self) -> bool {
        self.config.settings.summary.unwrap_or(true)
    }

    /// Path shown to the user for the configuration source.
    pub fn source(&self) -> String {
        match &self.file {
            Some(file) => display_relative(file, &self.root),
            None => "defaults".to_string(),
        }
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
