use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{BuildPlugin, parse_options};
use crate::{BuildConfig, BuildGraph, ChunkFormat};

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MinifyCssOptions {
    /// Matched against chunk names such as `main.css`.
    test: String,
}

impl Default for MinifyCssOptions {
    fn default() -> Self {
        Self {
            test: r"\.css$".to_string(),
        }
    }
}

/// Minify style chunks when `build.minify` is on. Comments are dropped.
#[derive(Debug)]
pub struct MinifyCssPlugin {
    test: Regex,
}

impl MinifyCssPlugin {
    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let options: MinifyCssOptions = parse_options(options)?;
        Ok(Self {
            test: Regex::new(&options.test)?,
        })
    }
}

fn minify_stylesheet(name: &str, source: &str) -> anyhow::Result<String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: name.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| anyhow::anyhow!("Failed to parse CSS: {:?}", e))?;

    stylesheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow::anyhow!("Failed to minify CSS: {:?}", e))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| anyhow::anyhow!("Failed to print CSS: {:?}", e))?;
    Ok(result.code)
}

impl BuildPlugin for MinifyCssPlugin {
    fn name(&self) -> &str {
        "minify-css"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        if !config.minify() {
            return Ok(());
        }
        for chunk in graph.chunks_mut() {
            if chunk.format() != ChunkFormat::Style || !self.test.is_match(&chunk.source_name()) {
                continue;
            }
            let code = minify_stylesheet(&chunk.source_name(), chunk.code())?;
            chunk.set_code(code);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Chunk, ChunkKind, ModuleGraph, ModuleId};
    use kiln_config::{BuildOptions, Environment};
    use serde_json::json;

    const SOURCE: &str = "/* src/b.css */\n.title {\n  color: #ff0000;\n  margin: 0px 0px 0px 0px;\n}\n";

    fn graph() -> BuildGraph {
        let chunk = Chunk::new(
            "main",
            ChunkKind::Entry,
            ChunkFormat::Style,
            vec![ModuleId::new("src/b.css").unwrap()],
        )
        .with_code(SOURCE.to_string(), None);
        BuildGraph::new(ModuleGraph::new(), vec![chunk], Vec::new()).unwrap()
    }

    fn config(minify: bool) -> BuildConfig {
        let options = BuildOptions {
            minify: Some(minify),
            ..BuildOptions::default()
        };
        BuildConfig::new("/app", Environment::Production, options)
    }

    #[test]
    fn minifies_and_drops_comments() {
        let plugin = MinifyCssPlugin::from_options(&Value::Null).unwrap();
        let mut graph = graph();
        plugin.apply(&mut graph, &config(true)).unwrap();
        let code = graph.chunks()[0].code();
        assert!(code.len() < SOURCE.len());
        assert!(!code.contains("src/b.css"));
        assert!(code.contains(".title{"));
    }

    #[test]
    fn respects_test_pattern_and_flag() {
        let plugin = MinifyCssPlugin::from_options(&json!({ "test": r"\.min\.css$" })).unwrap();
        let mut graph = graph();
        plugin.apply(&mut graph, &config(true)).unwrap();
        assert_eq!(graph.chunks()[0].code(), SOURCE);

        let plugin = MinifyCssPlugin::from_options(&Value::Null).unwrap();
        plugin.apply(&mut graph, &config(false)).unwrap();
        assert_eq!(graph.chunks()[0].code(), SOURCE);
    }
}
