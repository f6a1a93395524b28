use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use kiln_config::{ConfigDiscovery, KilnConfig, discovery::read_config_value};

use crate::config::ProjectConfig;
use crate::error::{ConfigError, Result};

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "KILN_";

impl ProjectConfig {
    /// Load configuration for the project at `root`.
    ///
    /// `config_path` (relative to `root`) replaces file discovery and must
    /// exist.
    pub fn load(root: &Path, config_path: Option<&Path>) -> Result<Self> {
        let file = match config_path {
            Some(path) => {
                let path = crate::commands::utils::resolve_path(path, root);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => ConfigDiscovery::new(root).find(),
        };

        let config = Self::figment(file.as_deref())?
            .extract::<KilnConfig>()
            .map_err(|e| ConfigError::InvalidValue {
                field: if e.path.is_empty() {
                    "config".to_string()
                } else {
                    e.path.join(".")
                },
                value: e.to_string(),
                hint: "Check kiln.toml and KILN_* environment variables for field types"
                    .to_string(),
            })?;

        tracing::debug!(
            root = %root.display(),
            file = ?file,
            "loaded configuration"
        );

        Ok(Self {
            root: root.to_path_buf(),
            file,
            config,
        })
    }

    /// The layered providers, lowest priority first.
    pub(crate) fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::new().merge(Serialized::defaults(KilnConfig::default()));

        if let Some(path) = file {
            let value = read_config_value(path).map_err(ConfigError::from)?;
            figment = figment.merge(Serialized::defaults(value));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }
}
