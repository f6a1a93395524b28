//! HTML document generation.
//!
//! The plugin only registers the document. Rendering waits for emission,
//! when chunk hashes are final.

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use super::{BuildPlugin, parse_options};
use crate::link::public_url;
use crate::{AssetOrigin, BuildConfig, BuildGraph, EmittedAsset, HtmlDocument, Inject};

/// Used when no template is configured.
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{{ title }}</title>
  </head>
  <body>
    <div id="root"></div>
  </body>
</html>
"#;

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HtmlOptions {
    /// Template file relative to the project root.
    template: Option<String>,
    filename: String,
    inject: Inject,
    /// Favicon file relative to the project root, emitted at the output root.
    favicon: Option<String>,
    title: Option<String>,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            template: None,
            filename: "index.html".to_string(),
            inject: Inject::Body,
            favicon: None,
            title: None,
        }
    }
}

#[derive(Debug)]
pub struct HtmlPlugin {
    options: HtmlOptions,
}

impl HtmlPlugin {
    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let options: HtmlOptions = parse_options(options)?;
        if options.filename.is_empty() {
            anyhow::bail!("filename must not be empty");
        }
        Ok(Self { options })
    }
}

impl BuildPlugin for HtmlPlugin {
    fn name(&self) -> &str {
        "html"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        let template = match &self.options.template {
            Some(template) => {
                let path = config.resolve_path(template);
                config
                    .runtime()
                    .read_to_string(&path)
                    .with_context(|| format!("cannot read template {}", path.display()))?
            }
            None => DEFAULT_TEMPLATE.to_string(),
        };

        let mut document = HtmlDocument::new(self.options.filename.clone(), template);
        document.inject = self.options.inject;
        document.title = self
            .options
            .title
            .clone()
            .unwrap_or_else(|| config.title().to_string());

        if let Some(favicon) = &self.options.favicon {
            let path = config.resolve_path(favicon);
            let source = config
                .runtime()
                .read_file(&path)
                .with_context(|| format!("cannot read favicon {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .with_context(|| format!("favicon path {} has no file name", path.display()))?;
            graph.emit_asset(EmittedAsset::new(
                file_name.clone(),
                source,
                AssetOrigin::Plugin(self.name().to_string()),
            ))?;
            document.favicon = Some(public_url(config.public_path(), &file_name));
        }

        graph.add_document(document);
        Ok(())
    }
}
