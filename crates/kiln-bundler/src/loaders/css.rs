use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};

use super::{Content, Loader, LoaderContext};

/// Parses and re-prints CSS. Minification happens later, on whole chunks.
#[derive(Debug, Default)]
pub struct CssLoader;

impl Loader for CssLoader {
    fn name(&self) -> &str {
        "css"
    }

    fn transform(&self, input: Content, cx: &LoaderContext<'_>) -> anyhow::Result<Content> {
        let source = input.into_text()?;
        let stylesheet = StyleSheet::parse(
            &source,
            ParserOptions {
                filename: cx.module.id.to_string(),
                ..Default::default()
            },
        )
        .map_err(|e| anyhow::anyhow!("Failed to parse CSS: {:?}", e))?;

        let result = stylesheet
            .to_css(PrinterOptions::default())
            .map_err(|e| anyhow::anyhow!("Failed to print CSS: {:?}", e))?;

        Ok(Content::Text(result.code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildConfig;
    use kiln_config::{BuildOptions, Environment};
    use kiln_graph::{AssetKind, Module, ModuleId};
    use std::path::PathBuf;

    fn run(source: &str) -> anyhow::Result<Content> {
        let module = Module::builder(
            ModuleId::new("src/b.css").unwrap(),
            PathBuf::from("/app/src/b.css"),
            AssetKind::Stylesheet,
        )
        .build();
        let config = BuildConfig::new("/app", Environment::Development, BuildOptions::default());
        let cx = LoaderContext {
            module: &module,
            config: &config,
            rule: "styles",
        };
        CssLoader.transform(Content::Text(source.to_string()), &cx)
    }

    #[test]
    fn output_is_not_minified() {
        let Content::Text(css) = run(".a{color:red}").unwrap() else {
            panic!("expected text");
        };
        assert!(css.contains(".a {"));
        assert!(css.contains("color: red"));
    }

    #[test]
    fn keeps_url_references() {
        let Content::Text(css) =
            run("@font-face { font-family: x; src: url(./font.woff); }").unwrap()
        else {
            panic!("expected text");
        };
        assert!(css.contains("font.woff"));
    }

    #[test]
    fn rejects_asset_urls_as_input() {
        let module = Module::builder(
            ModuleId::new("src/b.css").unwrap(),
            PathBuf::from("/app/src/b.css"),
            AssetKind::Stylesheet,
        )
        .build();
        let config = BuildConfig::new("/app", Environment::Development, BuildOptions::default());
        let cx = LoaderContext {
            module: &module,
            config: &config,
            rule: "styles",
        };
        let input = Content::Url {
            url: "data:text/css;base64,".to_string(),
            file: None,
        };
        assert!(CssLoader.transform(input, &cx).is_err());
    }
}
