use serde::{Deserialize, Serialize};

use crate::build::helpers::{default_min_chunks, default_vendor_pattern};

/// How modules are grouped into chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitPolicy {
    /// Entry, async, vendor and shared chunks.
    #[default]
    All,
    /// One chunk per format.
    Single,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    #[serde(default)]
    pub policy: SplitPolicy,

    /// Number of async chunks that must contain a module before it moves to
    /// the shared chunk
    #[serde(default = "default_min_chunks")]
    pub min_chunks: usize,

    /// Modules whose id contains this string go to the vendor chunk
    #[serde(default = "default_vendor_pattern")]
    pub vendor_pattern: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            policy: SplitPolicy::default(),
            min_chunks: default_min_chunks(),
            vendor_pattern: default_vendor_pattern(),
        }
    }
}
