use clap::ValueEnum;
use kiln_config::Environment;

/// Build environment
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum EnvArg {
    /// Readable output with source maps
    #[default]
    #[value(name = "development", alias = "dev")]
    Development,

    /// Minified output without source maps
    #[value(name = "production", alias = "prod")]
    Production,
}

impl From<EnvArg> for Environment {
    fn from(env: EnvArg) -> Self {
        match env {
            EnvArg::Development => Environment::Development,
            EnvArg::Production => Environment::Production,
        }
    }
}
