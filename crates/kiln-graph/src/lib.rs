//! # kiln-graph
//!
//! Pure data structures shared by every kiln crate.
//!
//! This crate has no knowledge of loaders, plugins or configuration files. It
//! describes what a build *is*:
//!
//! - [`ModuleGraph`]: discovered modules and the dependency edges between them
//! - [`Chunk`]: a group of modules emitted as one output file
//! - [`BuildGraph`]: the chunk graph handed to lifecycle plugins, together
//!   with emitted assets, HTML documents and free-form annotations
//! - [`Runtime`]: the file access abstraction used during discovery
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 BuildGraph                   │
//! │  chunks · assets · documents · annotations   │
//! └──────────────────────┬───────────────────────┘
//!                        │ owns
//!                        ▼
//!              ┌───────────────────┐
//!              │    ModuleGraph    │
//!              └─────────┬─────────┘
//!                        │
//!            ┌───────────┴───────────┐
//!            ▼                       ▼
//!       ┌─────────┐            ┌────────────┐
//!       │ Module  │───────────▶│ Dependency │
//!       │ (Node)  │            │   (Edge)   │
//!       └─────────┘            └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use kiln_graph::{AssetKind, Module, ModuleGraph, ModuleId};
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut graph = ModuleGraph::new();
//!
//! let id = ModuleId::new("src/main.js")?;
//! let module = Module::builder(id.clone(), PathBuf::from("/app/src/main.js"), AssetKind::Script)
//!     .content(b"console.log('hi');".to_vec())
//!     .entry(true)
//!     .build();
//!
//! graph.add_module(module)?;
//! assert_eq!(graph.entry(), Some(&id));
//! # Ok(())
//! # }
//! ```

pub mod asset_kind;
pub mod build_graph;
pub mod chunk;
pub mod dependency_chain;
pub mod error;
pub mod graph;
pub mod hash;
pub mod module;
pub mod module_id;
pub mod runtime;


pub use asset_kind::AssetKind;
pub use build_graph::{AssetOrigin, BuildGraph, EmittedAsset, HtmlDocument, Inject};
pub use chunk::{Chunk, ChunkFormat, ChunkKind};
pub use dependency_chain::DependencyChain;
pub use error::{GraphError, Result};
pub use graph::ModuleGraph;
pub use hash::{content_hash, HASH_LENGTH};
pub use module::{Dependency, DependencyKind, DependencyTarget, Module, ModuleBuilder};
pub use module_id::ModuleId;

pub use runtime::{FileMetadata, NativeRuntime, Runtime, RuntimeError, RuntimeResult};

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::memory::MemoryRuntime;
