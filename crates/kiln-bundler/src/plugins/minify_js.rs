use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{Minifier, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::BuildPlugin;
use crate::{BuildConfig, BuildGraph, ChunkFormat};

/// Minify rendered script chunks when `build.minify` is on.
#[derive(Debug, Default)]
pub struct MinifyJsPlugin;

/// Compress and mangle one script.
pub fn minify_script(name: &str, source: &str) -> anyhow::Result<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs().with_jsx(true)).parse();
    if !ret.errors.is_empty() {
        let errors: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
        anyhow::bail!("cannot parse {}: {}", name, errors.join("; "));
    }
    let mut program = ret.program;

    let minified = Minifier::new(MinifierOptions::default()).minify(&allocator, &mut program);
    let code = Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Ok(code)
}

impl BuildPlugin for MinifyJsPlugin {
    fn name(&self) -> &str {
        "minify-js"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        if !config.minify() {
            return Ok(());
        }
        for chunk in graph.chunks_mut() {
            if chunk.format() != ChunkFormat::Script {
                continue;
            }
            let before = chunk.size();
            let code = minify_script(&chunk.source_name(), chunk.code())?;
            tracing::debug!(chunk = %chunk.source_name(), before, after = code.len(), "minified");
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

    const SOURCE: &str = "// src/main.js\nfunction greet(name) {\n  const message = 'hello ' + name;\n  console.log(message);\n}\ngreet('kiln');\n";

    fn graph() -> BuildGraph {
        let chunk = Chunk::new(
            "main",
            ChunkKind::Entry,
            ChunkFormat::Script,
            vec![ModuleId::new("src/main.js").unwrap()],
        )
        .with_code(SOURCE.to_string(), Some("{}".to_string()));
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
    fn shrinks_scripts_when_enabled() {
        let mut graph = graph();
        MinifyJsPlugin.apply(&mut graph, &config(true)).unwrap();
        let chunk = &graph.chunks()[0];
        assert!(chunk.size() < SOURCE.len());
        assert!(!chunk.code().contains("// src/main.js"));
    }

    #[test]
    fn noop_when_disabled() {
        let mut graph = graph();
        MinifyJsPlugin.apply(&mut graph, &config(false)).unwrap();
        assert_eq!(graph.chunks()[0].code(), SOURCE);
        assert!(graph.chunks()[0].source_map().is_some());
    }

    #[test]
    fn reports_parse_errors() {
        assert!(minify_script("main.js", "let = ;").is_err());
    }
}
