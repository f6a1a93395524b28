//! Immutable per-build configuration.
//!
//! A [`BuildConfig`] is created once and passed by reference into every
//! phase and plugin. Nothing in the pipeline mutates it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::{BuildOptions, Environment, KilnConfig};
use path_clean::PathClean;

use crate::{NativeRuntime, Result, Runtime};

#[derive(Debug, Clone)]
pub struct BuildConfig {
    root: PathBuf,
    env: Environment,
    options: BuildOptions,
    title: String,
    runtime: Arc<dyn Runtime>,
}

impl BuildConfig {
    /// Configuration rooted at `root`, reading from the real file system.
    ///
    /// `options` are used as given: call [`BuildOptions::apply_environment`]
    /// (or use [`BuildConfig::from_kiln_config`]) to fill environment defaults.
    pub fn new(root: impl AsRef<Path>, env: Environment, options: BuildOptions) -> Self {
        Self {
            root: root.as_ref().clean(),
            env,
            options,
            title: String::new(),
            runtime: Arc::new(NativeRuntime::new()),
        }
    }

    /// Materialize the environment profile of a loaded config file.
    pub fn from_kiln_config(
        root: impl AsRef<Path>,
        env: Environment,
        config: KilnConfig,
    ) -> Result<Self> {
        let config = config
            .for_environment(env)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        let title = config.settings.title.clone().unwrap_or_default();
        Ok(Self::new(root, env, config.build).with_title(title))
    }

    pub fn with_runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn env(&self) -> Environment {
        self.env
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn runtime(&self) -> &Arc<dyn Runtime> {
        &self.runtime
    }

    /// Resolve a config-relative path against the project root.
    pub fn resolve_path(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path).clean()
    }

    pub fn entry_path(&self) -> PathBuf {
        self.resolve_path(&self.options.entry)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.resolve_path(&self.options.output_dir)
    }

    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.options
            .cache
            .enabled
            .then(|| self.resolve_path(&self.options.cache.dir))
    }

    pub fn minify(&self) -> bool {
        self.options.minify()
    }

    pub fn public_path(&self) -> &str {
        &self.options.public_path
    }

    pub fn css_public_path(&self) -> &str {
        &self.options.css_public_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_against_root() {
        let config = BuildConfig::new("/app/./web", Environment::Production, BuildOptions::default());
        assert_eq!(config.root(), Path::new("/app/web"));
        assert_eq!(config.entry_path(), PathBuf::from("/app/web/src/main.jsx"));
        assert_eq!(config.output_dir(), PathBuf::from("/app/web/dist"));
        assert_eq!(
            config.cache_dir(),
            Some(PathBuf::from("/app/web/node_modules/.cache/kiln"))
        );
    }

    #[test]
    fn from_kiln_config_applies_environment() {
        let config =
            BuildConfig::from_kiln_config("/app", Environment::Production, KilnConfig::default())
                .unwrap();
        assert!(config.minify());
        assert!(!config.options().source_maps());

        let config =
            BuildConfig::from_kiln_config("/app", Environment::Development, KilnConfig::default())
                .unwrap();
        assert!(!config.minify());
        assert!(config.options().source_maps());
    }
}
