//! The transform phase.
//!
//! Every discovered module runs through the loader chain of its rule on a
//! bounded rayon pool. Results come back in module id order regardless of
//! which worker finished first. The first failure cancels work that has not
//! started yet; when several modules fail, the one with the lowest id is
//! reported.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::loaders::ChainSet;
use crate::{
    AssetKind, BuildConfig, Content, EmittedFile, Error, Module, ModuleGraph, ModuleId,
    ProgressReporter, Result, TransformCache, content_hash,
};

/// What a module contributes to the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleOutput {
    /// Code placed in a chunk.
    Code(String),
    /// A reference other modules link to, with the file to emit, if any.
    Url {
        url: String,
        file: Option<EmittedFile>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedModule {
    pub id: ModuleId,
    pub kind: AssetKind,
    pub output: ModuleOutput,
}

impl TransformedModule {
    pub fn code(&self) -> Option<&str> {
        match &self.output {
            ModuleOutput::Code(code) => Some(code),
            ModuleOutput::Url { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.output {
            ModuleOutput::Url { url, .. } => Some(url),
            ModuleOutput::Code(_) => None,
        }
    }
}

pub struct Transformer<'a> {
    config: &'a BuildConfig,
    chains: &'a ChainSet,
    cache: Option<&'a TransformCache>,
    reporter: &'a dyn ProgressReporter,
}

impl<'a> Transformer<'a> {
    pub fn new(
        config: &'a BuildConfig,
        chains: &'a ChainSet,
        cache: Option<&'a TransformCache>,
        reporter: &'a dyn ProgressReporter,
    ) -> Self {
        Self {
            config,
            chains,
            cache,
            reporter,
        }
    }

    /// Transform every module of `graph`, sorted by module id.
    pub fn run(&self, graph: &ModuleGraph) -> Result<Vec<TransformedModule>> {
        // 0 lets rayon pick the available parallelism.
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.options().concurrency)
            .thread_name(|i| format!("kiln-transform-{}", i))
            .build()
            .map_err(|e| Error::Config(format!("cannot start transform workers: {}", e)))?;

        let modules: Vec<&Module> = graph
            .sorted_ids()
            .into_iter()
            .map(|id| graph.try_get(id))
            .collect::<std::result::Result<_, _>>()?;
        let total = modules.len();
        let cancelled = AtomicBool::new(false);
        let finished = AtomicUsize::new(0);

        let results: Vec<Option<Result<TransformedModule>>> = pool.install(|| {
            modules
                .par_iter()
                .map(|module| {
                    if cancelled.load(Ordering::Relaxed) {
                        return None;
                    }
                    let result = self.transform_module(module);
                    if result.is_err() {
                        cancelled.store(true, Ordering::Relaxed);
                    }
                    let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                    self.reporter.module_transformed(&module.id, done, total);
                    Some(result)
                })
                .collect()
        });

        // Skipped slots only exist after a failure, which is returned here.
        let mut transformed = Vec::with_capacity(total);
        for result in results.into_iter().flatten() {
            transformed.push(result?);
        }
        debug!(modules = transformed.len(), "transform finished");
        Ok(transformed)
    }

    fn transform_module(&self, module: &Module) -> Result<TransformedModule> {
        let chain = self.chains.for_module(module)?;

        if let Some(cache) = self.cache {
            match cache.get(module, chain) {
                Ok(Some(content)) => {
                    debug!(module = %module.id, "transform cache hit");
                    return finalize(module, content);
                }
                Ok(None) => {}
                Err(e) => warn!(module = %module.id, error = %e, "transform cache read failed"),
            }
        }

        let content = chain.apply(module, self.config)?;

        if let Some(cache) = self.cache {
            if let Err(e) = cache.put(module, chain, &content) {
                warn!(module = %module.id, error = %e, "transform cache write failed");
            }
        }

        debug!(module = %module.id, steps = ?chain.step_names(), "transformed");
        finalize(module, content)
    }
}

/// Turn the chain output into what the module contributes.
///
/// Scripts and stylesheets must end as code. Images and fonts whose chain
/// produced no url are emitted under `assets/` with a hashed name.
fn finalize(module: &Module, content: Content) -> Result<TransformedModule> {
    let output = if module.kind.is_code() {
        match content {
            Content::Text(text) => ModuleOutput::Code(text),
            Content::Bytes(bytes) => ModuleOutput::Code(String::from_utf8(bytes).map_err(|e| {
                Error::transform(module.id.as_str(), "output", format!("output is not valid UTF-8: {}", e))
            })?),
            Content::Url { .. } => {
                return Err(Error::transform(
                    module.id.as_str(),
                    "output",
                    format!("a {} chain must produce code, not an asset url", module.kind),
                ));
            }
        }
    } else {
        match content {
            Content::Url { url, file } => ModuleOutput::Url { url, file },
            other => {
                let bytes = other
                    .into_bytes()
                    .map_err(|e| Error::transform(module.id.as_str(), "output", e))?;
                let file_name = match module.id.extension() {
                    Some(ext) => format!("assets/{}.{}.{}", module.id.file_stem(), content_hash(&bytes), ext),
                    None => format!("assets/{}.{}", module.id.file_stem(), content_hash(&bytes)),
                };
                ModuleOutput::Url {
                    url: file_name.clone(),
                    file: Some(EmittedFile {
                        file_name,
                        source: bytes,
                    }),
                }
            }
        }
    };

    Ok(TransformedModule {
        id: module.id.clone(),
        kind: module.kind,
        output,
    })
}
