//! Copies static files into the output directory.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use walkdir::WalkDir;

use super::{BuildPlugin, parse_options};
use crate::{AssetOrigin, BuildConfig, BuildGraph, EmittedAsset};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyPattern {
    /// File or directory, relative to the project root.
    pub from: String,
    /// Destination directory, relative to the output directory.
    #[serde(default)]
    pub to: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CopyOptions {
    patterns: Vec<CopyPattern>,
}

#[derive(Debug)]
pub struct CopyPlugin {
    patterns: Vec<CopyPattern>,
}

impl CopyPlugin {
    pub fn new(patterns: Vec<CopyPattern>) -> Self {
        Self { patterns }
    }

    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let options: CopyOptions = parse_options(options)?;
        Ok(Self::new(options.patterns))
    }
}

fn destination(to: &str, relative: &Path) -> String {
    let relative = relative.to_string_lossy().replace('\\', "/");
    let to = to.trim_matches('/');
    if to.is_empty() {
        relative
    } else {
        format!("{}/{}", to, relative)
    }
}

impl BuildPlugin for CopyPlugin {
    fn name(&self) -> &str {
        "copy"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        let origin = AssetOrigin::Plugin(self.name().to_string());
        for pattern in &self.patterns {
            let source = config.resolve_path(&pattern.from);

            if source.is_dir() {
                for entry in WalkDir::new(&source).sort_by_file_name() {
                    let entry = entry.with_context(|| format!("cannot walk {}", source.display()))?;
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let relative = entry.path().strip_prefix(&source)?;
                    let bytes = std::fs::read(entry.path())
                        .with_context(|| format!("cannot read {}", entry.path().display()))?;
                    graph.emit_asset(EmittedAsset::new(
                        destination(&pattern.to, relative),
                        bytes,
                        origin.clone(),
                    ))?;
                }
                continue;
            }

            let bytes = config
                .runtime()
                .read_file(&source)
                .with_context(|| format!("nothing to copy at {}", source.display()))?;
            let name = source
                .file_name()
                .with_context(|| format!("{} has no file name", source.display()))?;
            graph.emit_asset(EmittedAsset::new(
                destination(&pattern.to, Path::new(name)),
                bytes,
                origin.clone(),
            ))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{BuildOptions, Environment};
    use serde_json::json;

    fn config(root: &Path) -> BuildConfig {
        BuildConfig::new(root, Environment::Production, BuildOptions::default())
    }

    #[test]
    fn copies_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("favicon.ico"), [1u8, 2, 3]).unwrap();
        std::fs::create_dir_all(dir.path().join("static/img")).unwrap();
        std::fs::write(dir.path().join("static/robots.txt"), "User-agent: *").unwrap();
        std::fs::write(dir.path().join("static/img/a.svg"), "<svg/>").unwrap();

        let plugin = CopyPlugin::from_options(&json!({
            "patterns": [
                { "from": "favicon.ico" },
                { "from": "static", "to": "public/" },
            ]
        }))
        .unwrap();
        let mut graph = BuildGraph::default();
        plugin.apply(&mut graph, &config(dir.path())).unwrap();

        let names: Vec<&str> = graph.assets().iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["favicon.ico", "public/img/a.svg", "public/robots.txt"]);
    }

    #[test]
    fn missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = CopyPlugin::new(vec![CopyPattern {
            from: "favicon.ico".into(),
            to: String::new(),
        }]);
        let err = plugin.apply(&mut BuildGraph::default(), &config(dir.path())).unwrap_err();
        assert!(format!("{:#}", err).contains("nothing to copy"));
    }
}
