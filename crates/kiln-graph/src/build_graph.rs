//! The graph handed to lifecycle plugins.
//!
//! `BuildGraph` owns the module graph and the chunks produced by splitting.
//! Plugins receive it mutably, but its API only allows them to read modules,
//! rewrite chunk code, emit additional files, register HTML documents and
//! attach annotations. Module membership cannot change.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::{Chunk, ChunkFormat, ChunkKind, ModuleGraph, ModuleId};

/// Who produced an emitted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetOrigin {
    Module(ModuleId),
    Plugin(String),
}

/// A file written verbatim to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedAsset {
    /// Path relative to the output directory (`/` separated).
    pub file_name: String,
    pub source: Vec<u8>,
    pub origin: AssetOrigin,
}

impl EmittedAsset {
    pub fn new(file_name: impl Into<String>, source: Vec<u8>, origin: AssetOrigin) -> Self {
        Self {
            file_name: file_name.into(),
            source,
            origin,
        }
    }
}

/// Where generated `<script>` tags go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inject {
    Head,
    #[default]
    Body,
}

/// An HTML file rendered once chunk file names are final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlDocument {
    pub file_name: String,
    /// Template source (minijinja syntax).
    pub template: String,
    pub title: String,
    pub inject: Inject,
    /// Public URL of the favicon, if any.
    pub favicon: Option<String>,
    /// Script URLs placed before the chunk scripts.
    pub scripts: Vec<String>,
    /// Stylesheet URLs placed before the chunk stylesheets.
    pub styles: Vec<String>,
    /// Whether initial chunks are injected.
    pub include_chunks: bool,
}

impl HtmlDocument {
    pub fn new(file_name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            template: template.into(),
            title: String::new(),
            inject: Inject::default(),
            favicon: None,
            scripts: Vec::new(),
            styles: Vec::new(),
            include_chunks: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BuildGraph {
    modules: ModuleGraph,
    chunks: Vec<Chunk>,
    assets: Vec<EmittedAsset>,
    documents: Vec<HtmlDocument>,
    annotations: BTreeMap<String, Value>,
}

impl BuildGraph {
    /// Assemble a graph, checking that no module sits in more than one chunk.
    pub fn new(modules: ModuleGraph, chunks: Vec<Chunk>, assets: Vec<EmittedAsset>) -> Result<Self> {
        let mut owner: BTreeMap<&ModuleId, &str> = BTreeMap::new();
        for chunk in &chunks {
            for module in chunk.modules() {
                if let Some(existing) = owner.insert(module, chunk.name()) {
                    return Err(GraphError::ModuleAlreadyChunked {
                        module: module.clone(),
                        chunk: existing.to_string(),
                    });
                }
            }
        }

        let mut graph = Self {
            modules,
            chunks,
            ..Self::default()
        };
        for asset in assets {
            graph.emit_asset(asset)?;
        }
        Ok(graph)
    }

    pub fn modules(&self) -> &ModuleGraph {
        &self.modules
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunks whose code may be rewritten.
    pub fn chunks_mut(&mut self) -> impl Iterator<Item = &mut Chunk> {
        self.chunks.iter_mut()
    }

    pub fn chunk(&self, name: &str, format: ChunkFormat) -> Option<&Chunk> {
        self.chunks
            .iter()
            .find(|chunk| chunk.name() == name && chunk.format() == format)
    }

    /// Chunks referenced from HTML: vendor chunks before the entry chunk.
    pub fn initial_chunks(&self, format: ChunkFormat) -> Vec<&Chunk> {
        let mut initial: Vec<&Chunk> = self
            .chunks
            .iter()
            .filter(|chunk| chunk.format() == format && chunk.kind().is_initial())
            .collect();
        initial.sort_by_key(|chunk| (chunk.kind() != ChunkKind::Vendor, chunk.name().to_string()));
        initial
    }

    pub fn assets(&self) -> &[EmittedAsset] {
        &self.assets
    }

    /// Add a file to the output. Emitting the same name twice is allowed only
    /// when the contents match.
    pub fn emit_asset(&mut self, asset: EmittedAsset) -> Result<()> {
        if let Some(existing) = self.assets.iter().find(|a| a.file_name == asset.file_name) {
            if existing.source == asset.source {
                return Ok(());
            }
            return Err(GraphError::ConflictingAsset(asset.file_name));
        }
        self.assets.push(asset);
        Ok(())
    }

    pub fn documents(&self) -> &[HtmlDocument] {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut [HtmlDocument] {
        &mut self.documents
    }

    pub fn add_document(&mut self, document: HtmlDocument) {
        self.documents.push(document);
    }

    pub fn annotate(&mut self, key: impl Into<String>, value: Value) {
        self.annotations.insert(key.into(), value);
    }

    pub fn annotation(&self, key: &str) -> Option<&Value> {
        self.annotations.get(key)
    }

    pub fn annotations(&self) -> &BTreeMap<String, Value> {
        &self.annotations
    }

    /// Number of modules placed in chunks.
    pub fn chunked_module_count(&self) -> usize {
        self.chunks.iter().map(|chunk| chunk.modules().len()).sum()
    }
}
