//! Typed asset classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chunk::ChunkFormat;

/// Processing pipeline a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Script,
    Stylesheet,
    Image,
    Font,
}

impl AssetKind {
    pub const ALL: [AssetKind; 4] = [
        AssetKind::Script,
        AssetKind::Stylesheet,
        AssetKind::Image,
        AssetKind::Font,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Script => "script",
            AssetKind::Stylesheet => "stylesheet",
            AssetKind::Image => "image",
            AssetKind::Font => "font",
        }
    }

    /// Chunk format for kinds that are grouped into chunks.
    ///
    /// Images and fonts are emitted as standalone files and return `None`.
    pub fn chunk_format(self) -> Option<ChunkFormat> {
        match self {
            AssetKind::Script => Some(ChunkFormat::Script),
            AssetKind::Stylesheet => Some(ChunkFormat::Style),
            AssetKind::Image | AssetKind::Font => None,
        }
    }

    /// Whether modules of this kind carry text that can reference other files.
    pub fn is_code(self) -> bool {
        self.chunk_format().is_some()
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "script" => Ok(AssetKind::Script),
            "stylesheet" => Ok(AssetKind::Stylesheet),
            "image" => Ok(AssetKind::Image),
            "font" => Ok(AssetKind::Font),
            other => Err(format!(
                "unknown asset kind '{other}' (expected script, stylesheet, image or font)"
            )),
        }
    }
}
