//! Top-level configuration and profile merging.
//!
//! For file discovery, see the `discovery` module.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::build::{BuildOptions, PluginOptions};
use crate::environment::Environment;
use crate::error::{ConfigError, Result as ConfigResult};
use crate::settings::GlobalSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    #[serde(default)]
    pub build: BuildOptions,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub profiles: HashMap<String, ProfileConfig>,

    #[serde(default)]
    pub settings: GlobalSettings,
}

/// Overrides deep-merged on top of the base configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default)]
    pub build: Value,

    #[serde(default)]
    pub settings: Value,
}

impl KilnConfig {
    /// Create from serde_json::Value
    ///
    /// # Example
    ///
    /// ```
    /// use kiln_config::KilnConfig;
    /// use serde_json::json;
    /// use std::path::PathBuf;
    ///
    /// let value = json!({
    ///     "build": {
    ///         "entry": "src/index.js",
    ///         "minify": true
    ///     }
    /// });
    ///
    /// let config = KilnConfig::from_value(value).unwrap();
    /// assert_eq!(config.build.entry, PathBuf::from("src/index.js"));
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Apply the named profile's overrides, then per-plugin overrides.
    pub fn materialize_profile(mut self, profile: Option<&str>) -> ConfigResult<Self> {
        let Some(name) = profile else {
            return Ok(self);
        };

        if let Some(profile_cfg) = self.profiles.get(name) {
            if !profile_cfg.build.is_null() {
                self.build = merge_into(&self.build, &profile_cfg.build)?;
            }
            if !profile_cfg.settings.is_null() {
                self.settings = merge_into(&self.settings, &profile_cfg.settings)?;
            }
        }

        apply_plugin_profiles(&mut self.build.plugins, name)?;
        Ok(self)
    }

    /// Materialize the environment's profile and fill environment defaults.
    pub fn for_environment(self, env: Environment) -> ConfigResult<Self> {
        let mut config = self.materialize_profile(Some(env.as_str()))?;
        config.build.apply_environment(env);
        tracing::debug!(
            env = %env,
            minify = config.build.minify(),
            source_maps = config.build.source_maps(),
            "materialized configuration"
        );
        Ok(config)
    }
}

fn merge_into<T>(base: &T, overrides: &Value) -> ConfigResult<T>
where
    T: Serialize + for<'de> Deserialize<'de>,
{
    let mut merged = serde_json::to_value(base).map_err(|err| ConfigError::InvalidProfileOverride {
        message: err.to_string(),
    })?;
    merge_values(&mut merged, overrides);
    serde_json::from_value(merged).map_err(|err| ConfigError::InvalidProfileOverride {
        message: err.to_string(),
    })
}

/// Deep-merge `update` into `target`. Objects merge key by key, everything
/// else (arrays included) replaces.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn apply_plugin_profiles(plugins: &mut [PluginOptions], profile: &str) -> ConfigResult<()> {
    for plugin in plugins {
        let Some(overrides) = plugin.profiles.get(profile).cloned() else {
            continue;
        };

        if overrides.is_null() {
            continue;
        }

        let original_profiles = plugin.profiles.clone();
        let mut updated: PluginOptions = merge_into(&*plugin, &overrides)?;
        updated.profiles = original_profiles;
        *plugin = updated;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn from_value_creates_config() {
        let value = json!({
            "build": {
                "entry": "src/index.js",
                "minify": true
            }
        });

        let config = KilnConfig::from_value(value).unwrap();
        assert_eq!(config.build.entry, PathBuf::from("src/index.js"));
        assert!(config.build.minify());
    }

    #[test]
    fn to_value_serializes_config() {
        let mut config = KilnConfig::default();
        config.build.minify = Some(true);

        let value = config.to_value().unwrap();
        assert_eq!(value["build"]["minify"], json!(true));
        assert_eq!(value["build"]["output_dir"], json!("dist"));
    }

    #[test]
    fn profile_merging_works() {
        let value = json!({
            "build": {
                "minify": false,
                "split": { "policy": "all" }
            },
            "profiles": {
                "production": {
                    "build": {
                        "minify": true,
                        "split": { "policy": "single" }
                    }
                }
            }
        });

        let config = KilnConfig::from_value(value)
            .unwrap()
            .materialize_profile(Some("production"))
            .unwrap();

        assert!(config.build.minify());
        assert_eq!(config.build.split.policy, crate::SplitPolicy::Single);
        assert_eq!(config.build.split.min_chunks, 2);
    }

    #[test]
    fn plugin_profiles_merge_into_options() {
        let value = json!({
            "build": {
                "plugins": [{
                    "name": "html",
                    "options": { "template": "public/index.html", "inject": "body" },
                    "profiles": {
                        "production": { "options": { "inject": "head" } }
                    }
                }]
            }
        });

        let config = KilnConfig::from_value(value)
            .unwrap()
            .materialize_profile(Some("production"))
            .unwrap();

        let html = config.build.plugin("html").unwrap();
        assert_eq!(html.options["inject"], "head");
        assert_eq!(html.options["template"], "public/index.html");
        assert!(html.profiles.contains_key("production"));
    }

    #[test]
    fn merge_values_replaces_arrays() {
        let mut target = json!({ "a": [1, 2], "b": { "c": 1 } });
        merge_values(&mut target, &json!({ "a": [3], "b": { "d": 2 } }));
        assert_eq!(target, json!({ "a": [3], "b": { "c": 1, "d": 2 } }));
    }
}
