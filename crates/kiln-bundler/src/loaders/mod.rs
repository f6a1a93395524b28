//! Loaders and loader chains.
//!
//! A loader is one transform step. A chain applies the loaders of a rule in
//! declaration order, each consuming the previous step's output:
//!
//! ```text
//! Bytes ──▶ [command: sass] ──▶ Text ──▶ [css] ──▶ Text
//! Bytes ──▶ [url] ──▶ Url { data:... }            (below limit)
//! Bytes ──▶ [url] ──▶ Url { assets/fonts/x.1a2b3c4d.woff, file }
//! ```

mod chain;
mod command;
mod css;
mod registry;
mod script;
mod url;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BuildConfig, Module};

pub use chain::{ChainSet, LoaderChain};
pub use command::CommandLoader;
pub use css::CssLoader;
pub use registry::{LoaderFactory, LoaderRegistry};
pub use script::ScriptLoader;
pub(crate) use script::source_type;
pub use url::UrlLoader;

/// A file produced by a loader, written relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedFile {
    pub file_name: String,
    pub source: Vec<u8>,
}

/// Data flowing through a loader chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    /// Raw file contents.
    Bytes(Vec<u8>),
    /// Decoded source code.
    Text(String),
    /// A reference to the module: a data URI, or a path relative to the
    /// output directory together with the file to emit there.
    Url {
        url: String,
        file: Option<EmittedFile>,
    },
}

impl Content {
    /// Decode to text, failing on URLs and invalid UTF-8.
    pub fn into_text(self) -> anyhow::Result<String> {
        match self {
            Content::Text(text) => Ok(text),
            Content::Bytes(bytes) => {
                String::from_utf8(bytes).map_err(|e| anyhow::anyhow!("input is not valid UTF-8: {}", e))
            }
            Content::Url { .. } => anyhow::bail!("expected source text, got an asset url"),
        }
    }

    /// Raw bytes of text or binary content.
    pub fn into_bytes(self) -> anyhow::Result<Vec<u8>> {
        match self {
            Content::Bytes(bytes) => Ok(bytes),
            Content::Text(text) => Ok(text.into_bytes()),
            Content::Url { .. } => anyhow::bail!("expected file contents, got an asset url"),
        }
    }

    pub fn variant(&self) -> &'static str {
        match self {
            Content::Bytes(_) => "bytes",
            Content::Text(_) => "text",
            Content::Url { .. } => "url",
        }
    }
}

/// What a loader sees besides its input.
pub struct LoaderContext<'a> {
    pub module: &'a Module,
    pub config: &'a BuildConfig,
    /// Name of the matched rule.
    pub rule: &'a str,
}

/// One transform step.
pub trait Loader: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn transform(&self, input: Content, cx: &LoaderContext<'_>) -> anyhow::Result<Content>;
}
