//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::build::BuildOptions;
use crate::error::{ConfigError, Result};

const MAX_CONCURRENCY: usize = 256;

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &BuildOptions) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use kiln_config::{BuildOptions, ConfigValidator, SchemaValidator};
///
/// SchemaValidator.validate(&BuildOptions::default()).unwrap();
/// ```
pub struct SchemaValidator;

fn schema_error(message: String, hint: &str) -> ConfigError {
    ConfigError::SchemaValidation {
        message,
        hint: Some(hint.to_string()),
    }
}

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &BuildOptions) -> Result<()> {
        if config.entry.as_os_str().is_empty() {
            return Err(ConfigError::NoEntry);
        }

        if config.rules.is_empty() {
            return Err(schema_error(
                "the rule table is empty".to_string(),
                "Remove 'build.rules' to use the default rules",
            ));
        }

        for rule in &config.rules {
            if rule.test.is_empty() {
                return Err(schema_error(
                    format!("rule '{}' has no test patterns", rule.name),
                    "Add at least one regular expression to 'test'",
                ));
            }
            for pattern in rule.test.iter().chain(&rule.exclude) {
                if let Err(err) = Regex::new(pattern) {
                    return Err(schema_error(
                        format!("rule '{}' has an invalid pattern '{}': {}", rule.name, pattern, err),
                        "Patterns use Rust regex syntax",
                    ));
                }
            }
            if rule.loaders.iter().any(|l| l.loader.trim().is_empty()) {
                return Err(schema_error(
                    format!("rule '{}' has a loader without a name", rule.name),
                    "Every 'use' entry needs a 'loader'",
                ));
            }
        }

        for plugin in &config.plugins {
            if plugin.name.trim().is_empty() {
                return Err(schema_error(
                    "plugin name cannot be empty".to_string(),
                    "Specify a registered plugin name for each plugin",
                ));
            }

            if plugin.order < -1000 || plugin.order > 1000 {
                return Err(schema_error(
                    format!(
                        "plugin order {} is out of reasonable range (-1000 to 1000)",
                        plugin.order
                    ),
                    "Use an order value between -1000 and 1000",
                ));
            }
        }

        for external in &config.externals {
            if external.trim().is_empty() {
                return Err(schema_error(
                    "external package names cannot be empty".to_string(),
                    "Remove empty strings from the 'externals' array",
                ));
            }
        }

        if config.concurrency > MAX_CONCURRENCY {
            return Err(schema_error(
                format!("concurrency {} exceeds {}", config.concurrency, MAX_CONCURRENCY),
                "Use 0 to size the pool from available parallelism",
            ));
        }

        if config.split.min_chunks == 0 {
            return Err(schema_error(
                "split.min_chunks must be at least 1".to_string(),
                "The default is 2",
            ));
        }

        Ok(())
    }
}

/// Filesystem validator (for CLI use)
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &BuildOptions) -> Result<()> {
        SchemaValidator.validate(config)?;

        let path = self.root.join(&config.entry);
        if !path.is_file() {
            return Err(ConfigError::EntryNotFound { path });
        }

        Ok(())
    }
}

/// Convenience function for schema-only validation
pub fn validate_schema(config: &BuildOptions) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for filesystem validation
pub fn validate_fs(config: &BuildOptions, root: impl AsRef<Path>) -> Result<()> {
    FsValidator::new(root).validate(config)
}
