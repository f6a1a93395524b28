pub mod build;
pub mod config;
pub mod discovery;
pub mod environment;
pub mod error;
pub mod settings;
pub mod validation;

// Re-export main types
pub use build::*;
pub use config::*;
pub use environment::Environment;
pub use error::*;
pub use settings::*;

// Re-export discovery and validation
pub use discovery::{discover, discover_with_profile, ConfigDiscovery, CONFIG_FILE_NAME};
pub use validation::{validate_fs, validate_schema, ConfigValidator, FsValidator, SchemaValidator};
