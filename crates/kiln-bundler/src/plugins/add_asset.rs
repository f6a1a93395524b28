//! Adds prebuilt scripts to the output and to every HTML document.

use std::path::Path;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{BuildPlugin, expand, parse_options};
use crate::link::public_url;
use crate::{AssetOrigin, BuildConfig, BuildGraph, EmittedAsset, content_hash};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AddAssetOptions {
    /// File pattern relative to the project root; `*` and `?` match within
    /// the file name only.
    filepath: String,
    /// Output directory for the copied files.
    output_path: String,
    /// URL prefix of the script tags; defaults to `{public_path}` + `output_path`.
    public_path: Option<String>,
    /// Append `?<content hash>` to the script URLs.
    hash: bool,
}

#[derive(Debug)]
pub struct AddAssetPlugin {
    options: AddAssetOptions,
}

impl AddAssetPlugin {
    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let options: AddAssetOptions = parse_options(options)?;
        if options.filepath.is_empty() {
            anyhow::bail!("'filepath' is required");
        }
        Ok(Self { options })
    }
}

/// Translate a file-name glob into an anchored regex.
fn glob_regex(glob: &str) -> anyhow::Result<Regex> {
    let mut pattern = String::from("^");
    for ch in glob.chars() {
        match ch {
            '*' => pattern.push_str("[^/]*"),
            '?' => pattern.push_str("[^/]"),
            other => pattern.push_str(&regex::escape(&other.to_string())),
        }
    }
    pattern.push('$');
    Ok(Regex::new(&pattern)?)
}

fn join_url(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else if prefix.ends_with('/') {
        format!("{}{}", prefix, name)
    } else {
        format!("{}/{}", prefix, name)
    }
}

impl BuildPlugin for AddAssetPlugin {
    fn name(&self) -> &str {
        "add-asset"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        if graph.documents().is_empty() {
            anyhow::bail!("no HTML document to add scripts to; register the html plugin first");
        }

        let filepath = config.resolve_path(expand(&self.options.filepath, config));
        let dir = filepath.parent().unwrap_or(Path::new("/"));
        let file_glob = filepath
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", filepath.display()))?;
        let matcher = glob_regex(&file_glob)?;

        let entries = config
            .runtime()
            .read_dir(dir)
            .with_context(|| format!("cannot list {}", dir.display()))?;
        let matches: Vec<_> = entries
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .is_some_and(|name| matcher.is_match(&name.to_string_lossy()))
            })
            .filter(|path| config.runtime().is_file(path))
            .collect();
        if matches.is_empty() {
            anyhow::bail!("no file matches {}", filepath.display());
        }

        let prefix = match &self.options.public_path {
            Some(public_path) => expand(public_path, config),
            None => public_url(config.public_path(), &self.options.output_path),
        };

        let mut urls = Vec::with_capacity(matches.len());
        for path in matches {
            let source = config.runtime().read_file(&path)?;
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut url = join_url(&prefix, &name);
            if self.options.hash {
                url = format!("{}?{}", url, content_hash(&source));
            }
            graph.emit_asset(EmittedAsset::new(
                join_url(self.options.output_path.trim_matches('/'), &name),
                source,
                AssetOrigin::Plugin(self.name().to_string()),
            ))?;
            urls.push(url);
        }

        for document in graph.documents_mut() {
            document.scripts.splice(0..0, urls.iter().cloned());
        }
        Ok(())
    }
}
