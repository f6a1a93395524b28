//! The build state machine.
//!
//! An [`Orchestrator`] owns the compiled rule table, loader chains, plugin
//! list, resolver and scanner for one [`BuildConfig`]. [`Orchestrator::run`]
//! drives the phases in order and stops at the first failure, reporting the
//! phase it happened in. The output directory is only touched at the very
//! end of post-processing, so a failed build leaves it as it was.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, info_span, warn};

use crate::discovery::Discovery;
use crate::link::link_modules;
use crate::loaders::ChainSet;
use crate::output::{self, OutputFile};
use crate::render::{module_assets, render_chunks};
use crate::scanner::Scanner;
use crate::splitting::split;
use crate::transform::Transformer;
use crate::{
    BuildConfig, BuildGraph, BuildPlugin, Error, FsResolver, LoaderRegistry, ModuleId,
    PluginRegistry, Resolver, Result, RuleTable, TransformCache,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildPhase {
    Idle,
    Discovering,
    Transforming,
    Splitting,
    PostProcessing,
    Done,
    Failed,
}

impl BuildPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildPhase::Idle => "idle",
            BuildPhase::Discovering => "discovering",
            BuildPhase::Transforming => "transforming",
            BuildPhase::Splitting => "splitting",
            BuildPhase::PostProcessing => "post-processing",
            BuildPhase::Done => "done",
            BuildPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error of a failed build together with the phase that raised it.
#[derive(Debug)]
pub struct BuildFailure {
    pub phase: BuildPhase,
    pub error: Error,
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}: {}", self.phase, self.error.kind(), self.error)
    }
}

impl std::error::Error for BuildFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl miette::Diagnostic for BuildFailure {
    fn code(&self) -> Option<Box<dyn fmt::Display + '_>> {
        miette::Diagnostic::code(&self.error)
    }

    fn help(&self) -> Option<Box<dyn fmt::Display + '_>> {
        miette::Diagnostic::help(&self.error)
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }
}

#[derive(Debug)]
pub struct BuildResult {
    pub graph: BuildGraph,
    /// Files written, relative to `output_dir`.
    pub files: Vec<OutputFile>,
    pub output_dir: PathBuf,
    pub duration: Duration,
}

impl BuildResult {
    pub fn total_size(&self) -> usize {
        self.files.iter().map(|file| file.size).sum()
    }
}

/// Receives progress while a build runs. Called from worker threads.
pub trait ProgressReporter: Send + Sync {
    fn phase_started(&self, _phase: BuildPhase) {}

    fn module_transformed(&self, _id: &ModuleId, _done: usize, _total: usize) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {}

pub struct Orchestrator<'a> {
    config: &'a BuildConfig,
    rules: RuleTable,
    chains: ChainSet,
    plugins: PluginRegistry,
    resolver: Box<dyn Resolver>,
    scanner: Scanner,
    reporter: Arc<dyn ProgressReporter>,
    clean: bool,
    phase: BuildPhase,
}

impl<'a> Orchestrator<'a> {
    /// Compile the rule table, loader chains and plugin list.
    ///
    /// Invalid rules, unknown loaders or plugins and bad options fail here,
    /// before any phase starts.
    pub fn new(config: &'a BuildConfig) -> Result<Self> {
        let options = config.options();
        let rules = RuleTable::new(&options.rules)?;
        let chains = ChainSet::build(&rules, &LoaderRegistry::with_builtins())?;
        let plugins = PluginRegistry::from_options(&options.plugins)?;
        debug!(
            rules = rules.len(),
            plugins = ?plugins.names(),
            "orchestrator ready"
        );
        Ok(Self {
            config,
            rules,
            chains,
            plugins,
            resolver: Box::new(FsResolver::from_config(config)),
            scanner: Scanner::new()?,
            reporter: Arc::new(NoopReporter),
            clean: false,
            phase: BuildPhase::Idle,
        })
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Append a plugin after the configured ones.
    pub fn with_plugin(mut self, plugin: Box<dyn BuildPlugin>) -> Self {
        self.plugins.add(plugin);
        self
    }

    pub fn with_resolver(mut self, resolver: Box<dyn Resolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Remove the previous output directory before writing.
    pub fn with_clean(mut self, clean: bool) -> Self {
        self.clean = clean;
        self
    }

    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    /// Run every phase. On failure the orchestrator ends in
    /// [`BuildPhase::Failed`] and the output directory is untouched.
    pub fn run(&mut self) -> std::result::Result<BuildResult, BuildFailure> {
        let started = Instant::now();
        let _span = info_span!("build", env = %self.config.env()).entered();

        match self.execute() {
            Ok((graph, files)) => {
                self.enter(BuildPhase::Done);
                let duration = started.elapsed();
                info!(
                    files = files.len(),
                    elapsed_ms = duration.as_millis() as u64,
                    "build finished"
                );
                Ok(BuildResult {
                    graph,
                    files,
                    output_dir: self.config.output_dir(),
                    duration,
                })
            }
            Err(error) => {
                let phase = self.phase;
                self.enter(BuildPhase::Failed);
                Err(BuildFailure { phase, error })
            }
        }
    }

    fn enter(&mut self, phase: BuildPhase) {
        debug!(from = %self.phase, to = %phase, "phase change");
        self.phase = phase;
        self.reporter.phase_started(phase);
    }

    fn execute(&mut self) -> Result<(BuildGraph, Vec<OutputFile>)> {
        let config = self.config;

        self.enter(BuildPhase::Discovering);
        let modules =
            Discovery::new(config, &self.rules, &self.scanner, self.resolver.as_ref()).run()?;
        info!(modules = modules.len(), "discovered modules");
        for name in modules.externals() {
            if !config.options().externals.iter().any(|listed| listed == name) {
                warn!(package = name, "bare import left external; it must be provided at runtime");
            }
        }

        self.enter(BuildPhase::Transforming);
        let cache = config.cache_dir().and_then(|dir| match TransformCache::open(&dir) {
            Ok(cache) => Some(cache),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "transform cache unavailable");
                None
            }
        });
        let mut transformed =
            Transformer::new(config, &self.chains, cache.as_ref(), self.reporter.as_ref())
                .run(&modules)?;
        let report = link_modules(&modules, &mut transformed, config)?;
        info!(
            modules = transformed.len(),
            links = report.replacements,
            "transformed modules"
        );

        self.enter(BuildPhase::Splitting);
        let chunks = split(&modules, &config.options().split);
        let chunks = render_chunks(chunks, &transformed, config)?;
        let assets = module_assets(&transformed);
        let mut graph = BuildGraph::new(modules, chunks, assets)?;
        info!(chunks = graph.chunks().len(), "split chunks");

        self.enter(BuildPhase::PostProcessing);
        self.plugins.run(&mut graph, config)?;
        let files = output::emit(&graph, config, &config.output_dir(), self.clean)?;
        Ok((graph, files))
    }
}

/// Build with the configured plugins and no progress reporting.
pub fn build(config: &BuildConfig) -> std::result::Result<BuildResult, BuildFailure> {
    Orchestrator::new(config)
        .map_err(|error| BuildFailure {
            phase: BuildPhase::Idle,
            error,
        })?
        .run()
}
