//! Chunk rendering.
//!
//! Module code is concatenated in chunk order (dependencies first), each
//! module preceded by a comment naming it. Source maps are line based: every
//! line of a module maps to the same line of its transformed source.

use oxc_sourcemap::SourceMapBuilder;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::transform::{ModuleOutput, TransformedModule};
use crate::{
    AssetOrigin, BuildConfig, Chunk, ChunkFormat, EmittedAsset, Error, ModuleId, Result,
};

/// Render the code (and optional source map) of every chunk.
pub fn render_chunks(
    chunks: Vec<Chunk>,
    modules: &[TransformedModule],
    config: &BuildConfig,
) -> Result<Vec<Chunk>> {
    let code: FxHashMap<&ModuleId, &str> = modules
        .iter()
        .filter_map(|module| module.code().map(|code| (&module.id, code)))
        .collect();

    chunks
        .into_iter()
        .map(|chunk| {
            let with_map = match chunk.format() {
                ChunkFormat::Script => config.options().source_maps(),
                ChunkFormat::Style => config.options().css_source_maps(),
            };
            let mut renderer = ChunkRenderer::new(chunk.format(), with_map);
            for id in chunk.modules() {
                let source = code.get(id).ok_or_else(|| {
                    Error::transform(id.as_str(), "render", "module has no code output")
                })?;
                renderer.push(id, source);
            }
            let (code, map) = renderer.finish();
            debug!(chunk = %chunk.source_name(), bytes = code.len(), "rendered chunk");
            Ok(chunk.with_code(code, map))
        })
        .collect()
}

/// Files emitted by url loaders or by the transform fallback.
pub fn module_assets(modules: &[TransformedModule]) -> Vec<EmittedAsset> {
    modules
        .iter()
        .filter_map(|module| match &module.output {
            ModuleOutput::Url {
                file: Some(file), ..
            } => Some(EmittedAsset::new(
                file.file_name.clone(),
                file.source.clone(),
                AssetOrigin::Module(module.id.clone()),
            )),
            _ => None,
        })
        .collect()
}

struct ChunkRenderer {
    format: ChunkFormat,
    code: String,
    line: u32,
    map: Option<SourceMapBuilder>,
}

impl ChunkRenderer {
    fn new(format: ChunkFormat, with_map: bool) -> Self {
        Self {
            format,
            code: String::new(),
            line: 0,
            map: with_map.then(SourceMapBuilder::default),
        }
    }

    fn push(&mut self, id: &ModuleId, source: &str) {
        let banner = match self.format {
            ChunkFormat::Script => format!("// {}\n", id),
            ChunkFormat::Style => format!("/* {} */\n", id),
        };
        self.code.push_str(&banner);
        self.line += 1;

        if let Some(map) = &mut self.map {
            let source_id = map.set_source_and_content(id.as_str(), source);
            for (offset, _) in source.lines().enumerate() {
                let offset = offset as u32;
                map.add_token(self.line + offset, 0, offset, 0, Some(source_id), None);
            }
        }

        self.code.push_str(source);
        let mut written = source.matches('\n').count();
        if !source.ends_with('\n') {
            self.code.push('\n');
            written += 1;
        }
        self.line += written as u32;
    }

    fn finish(self) -> (String, Option<String>) {
        let map = self
            .map
            .map(|builder| builder.into_sourcemap().to_json_string());
        (self.code, map)
    }
}
