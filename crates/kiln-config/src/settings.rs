//! Global configuration settings shared across profiles.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Print the per-file size table after a successful build.
    #[serde(default)]
    pub summary: Option<bool>,

    /// Page title passed to HTML templates.
    #[serde(default)]
    pub title: Option<String>,
}
