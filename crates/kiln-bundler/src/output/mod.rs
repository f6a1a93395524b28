//! Emission: hashed chunk files, source maps, assets and HTML documents.

mod html;
pub mod writer;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use html::render_document;
pub use writer::{clean_output_dir, validate_output_dir, validate_output_path, write_files};

use crate::{BuildConfig, BuildGraph, ChunkFormat, Result};

/// A file written to the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
    /// Path relative to the output directory (`/` separated).
    pub path: String,
    pub size: usize,
}

/// Everything the build produces, as `(relative name, content)` pairs.
///
/// Chunks come first (each followed by its map), then emitted assets, then
/// HTML documents.
pub fn collect_files(graph: &BuildGraph, config: &BuildConfig) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();

    for chunk in graph.chunks() {
        let file_name = chunk.file_name();
        let mut code = chunk.code().to_string();
        if let Some(map) = chunk.source_map() {
            let map_name = format!("{}.map", file_name);
            let url = map_name.rsplit('/').next().unwrap_or(&map_name).to_string();
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&match chunk.format() {
                ChunkFormat::Script => format!("//# sourceMappingURL={}\n", url),
                ChunkFormat::Style => format!("/*# sourceMappingURL={} */\n", url),
            });
            files.push((file_name, code.into_bytes()));
            files.push((map_name, map.as_bytes().to_vec()));
        } else {
            files.push((file_name, code.into_bytes()));
        }
    }

    for asset in graph.assets() {
        files.push((asset.file_name.clone(), asset.source.clone()));
    }

    for document in graph.documents() {
        let html = render_document(document, graph, config)?;
        files.push((document.file_name.clone(), html.into_bytes()));
    }

    Ok(files)
}

/// Write the build into `dir`.
///
/// Documents are rendered and every path is validated before anything on
/// disk changes, so `clean` only removes the previous output once the new
/// one is ready to be written.
pub fn emit(
    graph: &BuildGraph,
    config: &BuildConfig,
    dir: &Path,
    clean: bool,
) -> Result<Vec<OutputFile>> {
    let files = collect_files(graph, config)?;
    let checked = validate_output_dir(dir)?;
    for (name, _) in &files {
        validate_output_path(&checked, name)?;
    }
    if clean {
        clean_output_dir(&checked)?;
    }
    write_files(&checked, &files)?;
    let written: Vec<OutputFile> = files
        .into_iter()
        .map(|(path, content)| OutputFile {
            path,
            size: content.len(),
        })
        .collect();
    info!(files = written.len(), dir = %dir.display(), "output written");
    Ok(written)
}
