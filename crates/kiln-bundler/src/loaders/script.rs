use std::path::Path;

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::{Content, Loader, LoaderContext};

/// Source type for a script path. JSX is accepted in every script file.
pub(crate) fn source_type(path: &Path) -> SourceType {
    SourceType::from_path(path)
        .unwrap_or(SourceType::mjs())
        .with_jsx(true)
}

/// Parse `source` and return the joined parser diagnostics, if any.
pub(crate) fn syntax_errors(path: &Path, source: &str) -> Option<String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(path)).parse();
    if ret.errors.is_empty() {
        return None;
    }
    Some(
        ret.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Decodes and syntax-checks JavaScript. The source passes through unchanged.
#[derive(Debug, Default)]
pub struct ScriptLoader;

impl Loader for ScriptLoader {
    fn name(&self) -> &str {
        "script"
    }

    fn transform(&self, input: Content, cx: &LoaderContext<'_>) -> anyhow::Result<Content> {
        let source = input.into_text()?;
        if let Some(errors) = syntax_errors(cx.module.path(), &source) {
            anyhow::bail!("syntax error: {}", errors);
        }
        Ok(Content::Text(source))
    }
}
