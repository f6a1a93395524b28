//! Module resolution.
//!
//! Lookup order:
//! 1. Skip URLs, data URIs and fragment-only references
//! 2. Path aliases (`@/components/App` → `src/components/App`)
//! 3. Relative paths, with extension probing and directory `index` files
//! 4. Packages in `node_modules`, walking up from the importer
//! 5. Bare imports that are not installed become externals

mod aliases;
mod extensions;
mod packages;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use kiln_config::ResolveOptions;
use path_clean::PathClean;

use crate::{AssetKind, BuildConfig, Error, Result, Runtime};

pub use aliases::resolve_alias;
pub use extensions::try_file_or_dir;
pub use packages::package_name;

/// Where a specifier points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file to bundle.
    Module(PathBuf),
    /// A package provided at runtime.
    External(String),
}

pub trait Resolver: Send + Sync {
    /// Resolve `specifier` as written in `importer`.
    ///
    /// Returns `Ok(None)` for references that are not files (remote URLs,
    /// data URIs, `#fragment`).
    fn resolve(
        &self,
        specifier: &str,
        importer: &Path,
        importer_kind: AssetKind,
    ) -> Result<Option<Resolution>>;
}

/// Strip `?query` and `#hash`, and filter out references that never name a
/// local file.
pub fn clean_specifier(specifier: &str) -> Option<&str> {
    let specifier = specifier.trim();
    if specifier.is_empty()
        || specifier.starts_with('#')
        || specifier.starts_with("//")
        || specifier.starts_with("data:")
        || specifier.starts_with("http://")
        || specifier.starts_with("https://")
    {
        return None;
    }
    let end = specifier.find(['?', '#']).unwrap_or(specifier.len());
    let specifier = &specifier[..end];
    (!specifier.is_empty()).then_some(specifier)
}

fn is_relative(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
}

/// Resolver backed by a [`Runtime`].
#[derive(Debug, Clone)]
pub struct FsResolver {
    root: PathBuf,
    options: ResolveOptions,
    runtime: Arc<dyn Runtime>,
}

impl FsResolver {
    pub fn new(root: impl Into<PathBuf>, options: ResolveOptions, runtime: Arc<dyn Runtime>) -> Self {
        Self {
            root: root.into(),
            options,
            runtime,
        }
    }

    pub fn from_config(config: &BuildConfig) -> Self {
        Self::new(
            config.root(),
            config.options().resolve.clone(),
            Arc::clone(config.runtime()),
        )
    }

    fn not_found(&self, specifier: &str, importer: &Path) -> Error {
        Error::ModuleNotFound {
            specifier: specifier.to_string(),
            importer: importer
                .strip_prefix(&self.root)
                .unwrap_or(importer)
                .to_string_lossy()
                .replace('\\', "/"),
        }
    }

    fn resolve_file(&self, candidate: PathBuf, specifier: &str, importer: &Path) -> Result<Resolution> {
        try_file_or_dir(&candidate.clean(), &self.options.extensions, self.runtime.as_ref())
            .map(Resolution::Module)
            .ok_or_else(|| self.not_found(specifier, importer))
    }

    fn resolve_package(&self, specifier: &str, importer: &Path) -> Result<Resolution> {
        let (name, subpath) = package_name(specifier);
        let start = importer.parent().unwrap_or(&self.root);
        for dir in start.ancestors() {
            for modules in &self.options.modules {
                let package_dir = dir.join(modules).join(name);
                if !self.runtime.exists(&package_dir) {
                    continue;
                }
                let found = match subpath {
                    Some(subpath) => try_file_or_dir(
                        &package_dir.join(subpath),
                        &self.options.extensions,
                        self.runtime.as_ref(),
                    ),
                    None => packages::package_entry(
                        &package_dir,
                        &self.options.extensions,
                        self.runtime.as_ref(),
                    ),
                };
                return found
                    .map(|path| Resolution::Module(path.clean()))
                    .ok_or_else(|| self.not_found(specifier, importer));
            }
        }
        Ok(Resolution::External(name.to_string()))
    }
}

impl Resolver for FsResolver {
    fn resolve(
        &self,
        specifier: &str,
        importer: &Path,
        importer_kind: AssetKind,
    ) -> Result<Option<Resolution>> {
        let Some(spec) = clean_specifier(specifier) else {
            return Ok(None);
        };
        let base = importer.parent().unwrap_or(&self.root);
        let stylesheet = importer_kind == AssetKind::Stylesheet;

        // `~pkg/file.css` names a package from a stylesheet.
        if stylesheet {
            if let Some(package) = spec.strip_prefix('~') {
                return self.resolve_package(package, importer).map(Some);
            }
        }

        if let Some(target) = resolve_alias(spec, &self.options.alias) {
            return self
                .resolve_file(self.root.join(target), specifier, importer)
                .map(Some);
        }

        if is_relative(spec) {
            return self.resolve_file(base.join(spec), specifier, importer).map(Some);
        }

        if spec.starts_with('/') {
            // Root-relative URLs in stylesheets are served as-is.
            if stylesheet {
                return Ok(None);
            }
            return self.resolve_file(PathBuf::from(spec), specifier, importer).map(Some);
        }

        // `url(font.woff)` and `@import "reset.css"` are relative in CSS.
        if stylesheet {
            return self.resolve_file(base.join(spec), specifier, importer).map(Some);
        }

        self.resolve_package(spec, importer).map(Some)
    }
}
