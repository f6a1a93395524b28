//! Output chunks.
//!
//! A chunk is a group of modules emitted as one file. Membership is fixed
//! when the chunk is created: later stages may rewrite the rendered code (for
//! example minification) but cannot add or remove modules.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{content_hash, ModuleId};

/// Role of a chunk in the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    /// Modules statically reachable from the entry.
    Entry,
    /// Modules loaded through a dynamic import.
    Async,
    /// Modules shared by several async chunks.
    Shared,
    /// Third-party modules split out of the entry.
    Vendor,
}

impl ChunkKind {
    /// Initial chunks are referenced directly from the HTML document.
    pub fn is_initial(self) -> bool {
        matches!(self, ChunkKind::Entry | ChunkKind::Vendor)
    }
}

/// What a chunk contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkFormat {
    Script,
    Style,
}

impl ChunkFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ChunkFormat::Script => "js",
            ChunkFormat::Style => "css",
        }
    }

    /// Directory under the output root.
    pub fn directory(self) -> &'static str {
        match self {
            ChunkFormat::Script => "js",
            ChunkFormat::Style => "css",
        }
    }
}

impl fmt::Display for ChunkFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    name: String,
    kind: ChunkKind,
    format: ChunkFormat,
    modules: Vec<ModuleId>,
    code: String,
    source_map: Option<String>,
    content_hash: String,
}

impl Chunk {
    pub fn new(
        name: impl Into<String>,
        kind: ChunkKind,
        format: ChunkFormat,
        modules: Vec<ModuleId>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            format,
            modules,
            code: String::new(),
            source_map: None,
            content_hash: content_hash(b""),
        }
    }

    /// Attach rendered code and its source map.
    pub fn with_code(mut self, code: String, source_map: Option<String>) -> Self {
        self.content_hash = content_hash(code.as_bytes());
        self.code = code;
        self.source_map = source_map;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ChunkKind {
        self.kind
    }

    pub fn format(&self) -> ChunkFormat {
        self.format
    }

    /// Member modules, dependencies first.
    pub fn modules(&self) -> &[ModuleId] {
        &self.modules
    }

    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains(id)
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn source_map(&self) -> Option<&str> {
        self.source_map.as_deref()
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    /// Replace the rendered code and refresh the content hash.
    ///
    /// Source maps are line based, so the map survives only when the new code
    /// has the same number of lines.
    pub fn set_code(&mut self, code: String) {
        if code.lines().count() != self.code.lines().count() {
            self.source_map = None;
        }
        self.content_hash = content_hash(code.as_bytes());
        self.code = code;
    }

    /// Name before hashing, e.g. `main.css`.
    pub fn source_name(&self) -> String {
        format!("{}.{}", self.name, self.format.extension())
    }

    /// Output path relative to the output directory, e.g. `js/main.1a2b3c4d.js`.
    pub fn file_name(&self) -> String {
        format!(
            "{}/{}.{}.{}",
            self.format.directory(),
            self.name,
            self.content_hash,
            self.format.extension()
        )
    }

    pub fn size(&self) -> usize {
        self.code.len()
    }
}
