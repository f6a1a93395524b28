//! HTML document rendering and tag injection.

use minijinja::{Environment, context};

use crate::link::public_url;
use crate::{BuildConfig, BuildGraph, ChunkFormat, Error, HtmlDocument, Inject, Result};

/// Render a document's template and inject the initial chunks.
pub fn render_document(
    document: &HtmlDocument,
    graph: &BuildGraph,
    config: &BuildConfig,
) -> Result<String> {
    let env = Environment::new();
    let html = env
        .render_str(
            &document.template,
            context! {
                title => document.title,
                env => config.env().as_str(),
                public_path => config.public_path(),
            },
        )
        .map_err(|e| {
            Error::plugin("html", format!("cannot render {}: {:#}", document.file_name, e))
        })?;

    let mut head = String::new();
    let mut scripts = String::new();

    if let Some(favicon) = &document.favicon {
        head.push_str(&format!("<link rel=\"icon\" href=\"{}\">", favicon));
    }

    let mut styles = document.styles.clone();
    let mut script_urls = document.scripts.clone();
    if document.include_chunks {
        styles.extend(
            graph
                .initial_chunks(ChunkFormat::Style)
                .iter()
                .map(|chunk| public_url(config.public_path(), &chunk.file_name())),
        );
        script_urls.extend(
            graph
                .initial_chunks(ChunkFormat::Script)
                .iter()
                .map(|chunk| public_url(config.public_path(), &chunk.file_name())),
        );
    }

    for href in &styles {
        head.push_str(&format!("<link href=\"{}\" rel=\"stylesheet\">", href));
    }
    for src in &script_urls {
        scripts.push_str(&format!("<script src=\"{}\"></script>", src));
    }

    let html = match document.inject {
        Inject::Head => {
            head.push_str(&scripts);
            inject_before(&html, "</head>", &head)
        }
        Inject::Body => {
            let html = inject_before(&html, "</head>", &head);
            inject_before(&html, "</body>", &scripts)
        }
    };
    Ok(html)
}

/// Insert `tags` before the first `closing` tag (ASCII case-insensitive),
/// or append them when the tag is absent.
fn inject_before(html: &str, closing: &str, tags: &str) -> String {
    if tags.is_empty() {
        return html.to_string();
    }
    match html.to_ascii_lowercase().find(closing) {
        Some(index) => format!("{}{}{}", &html[..index], tags, &html[index..]),
        None => format!("{}{}", html, tags),
    }
}
