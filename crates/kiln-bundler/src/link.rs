//! Asset reference linking.
//!
//! After the transform phase every image and font has a final URL. Code
//! that references them is rewritten so the reference survives
//! concatenation:
//!
//! - `import logo from './logo.png'` → `const logo = "/assets/images/logo.1a2b3c4d.png";`
//! - `require('./logo.png')` → `"/assets/images/logo.1a2b3c4d.png"`
//! - `url(./font.woff)` → `url(../assets/fonts/font.1a2b3c4d.woff)`
//!
//! Stylesheet imports are dropped from scripts (the stylesheet goes to a
//! style chunk) and bundled `@import`s are dropped from stylesheets.

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::transform::{ModuleOutput, TransformedModule};
use crate::{AssetKind, BuildConfig, DependencyKind, Error, ModuleGraph, ModuleId, Result};

/// Number of references rewritten per module.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkReport {
    pub replacements: usize,
    pub rewritten_modules: Vec<ModuleId>,
}

/// Prefix a relative asset URL with a public path. Data URIs are absolute.
pub fn public_url(public_path: &str, url: &str) -> String {
    if url.starts_with("data:") || url.contains("://") {
        return url.to_string();
    }
    if public_path.is_empty() {
        return url.to_string();
    }
    if public_path.ends_with('/') {
        format!("{}{}", public_path, url)
    } else {
        format!("{}/{}", public_path, url)
    }
}

struct Rewrite<'c> {
    module: &'c ModuleId,
    code: String,
    replacements: usize,
}

impl<'c> Rewrite<'c> {
    fn replace<F>(&mut self, pattern: &str, replacement: F) -> Result<()>
    where
        F: Fn(&Captures<'_>) -> String,
    {
        let re = Regex::new(pattern).map_err(|e| Error::transform(self.module.as_str(), "link", e))?;
        let count = re.find_iter(&self.code).count();
        if count > 0 {
            self.code = re.replace_all(&self.code, |caps: &Captures<'_>| replacement(caps)).into_owned();
            self.replacements += count;
        }
        Ok(())
    }
}

fn quoted(spec: &str) -> String {
    format!(r#"['"]{}['"]"#, regex::escape(spec))
}

fn js_string(module: &ModuleId, value: &str) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::transform(module.as_str(), "link", e))
}

fn link_script_asset(rw: &mut Rewrite<'_>, spec: &str, url: &str) -> Result<()> {
    let literal = js_string(rw.module, url)?;
    let q = quoted(spec);
    rw.replace(
        &format!(r"import\s+([A-Za-z_$][\w$]*)\s+from\s*{}\s*;?", q),
        |caps| format!("const {} = {};", &caps[1], literal),
    )?;
    rw.replace(&format!(r"require\(\s*{}\s*\)", q), |_| literal.clone())?;
    rw.replace(&format!(r"import\s*{}\s*;?", q), |_| String::new())
}

fn unlink_script_style(rw: &mut Rewrite<'_>, spec: &str) -> Result<()> {
    let q = quoted(spec);
    rw.replace(
        &format!(r"import\s+([A-Za-z_$][\w$]*)\s+from\s*{}\s*;?", q),
        |caps| format!("const {} = {{}};", &caps[1]),
    )?;
    rw.replace(&format!(r"import\s*{}\s*;?", q), |_| String::new())?;
    rw.replace(&format!(r"require\(\s*{}\s*\)", q), |_| "{}".to_string())
}

fn link_css_url(rw: &mut Rewrite<'_>, spec: &str, url: &str) -> Result<()> {
    rw.replace(
        &format!(r#"url\(\s*(['"]?){}(['"]?)\s*\)"#, regex::escape(spec)),
        |caps| format!("url({}{}{})", &caps[1], url, &caps[2]),
    )
}

fn unlink_css_import(rw: &mut Rewrite<'_>, spec: &str) -> Result<()> {
    rw.replace(
        &format!(
            r#"@import\s+(?:url\(\s*)?['"]?{}['"]?\s*\)?[^;]*;[ \t]*\n?"#,
            regex::escape(spec)
        ),
        |_| String::new(),
    )
}

/// Rewrite asset references in the code of every transformed module.
pub fn link_modules(
    graph: &ModuleGraph,
    modules: &mut [TransformedModule],
    config: &BuildConfig,
) -> Result<LinkReport> {
    let urls: FxHashMap<ModuleId, String> = modules
        .iter()
        .filter_map(|m| m.url().map(|url| (m.id.clone(), url.to_string())))
        .collect();
    let kinds: FxHashMap<ModuleId, AssetKind> = modules.iter().map(|m| (m.id.clone(), m.kind)).collect();

    let mut report = LinkReport::default();
    for transformed in modules.iter_mut() {
        let ModuleOutput::Code(code) = &mut transformed.output else {
            continue;
        };
        let module = graph.try_get(&transformed.id)?;
        let mut rw = Rewrite {
            module: &transformed.id,
            code: std::mem::take(code),
            replacements: 0,
        };

        let mut seen: Vec<&str> = Vec::new();
        for dep in &module.dependencies {
            let Some(target) = dep.target_module() else {
                continue;
            };
            if seen.contains(&dep.specifier.as_str()) {
                continue;
            }
            seen.push(&dep.specifier);

            match (transformed.kind, urls.get(target)) {
                (AssetKind::Script, Some(url)) => {
                    link_script_asset(&mut rw, &dep.specifier, &public_url(config.public_path(), url))?
                }
                (AssetKind::Script, None) if kinds.get(target) == Some(&AssetKind::Stylesheet) => {
                    unlink_script_style(&mut rw, &dep.specifier)?
                }
                (AssetKind::Stylesheet, Some(url)) => {
                    link_css_url(&mut rw, &dep.specifier, &public_url(config.css_public_path(), url))?
                }
                (AssetKind::Stylesheet, None) if dep.kind == DependencyKind::Import => {
                    unlink_css_import(&mut rw, &dep.specifier)?
                }
                _ => {}
            }
        }

        if rw.replacements > 0 {
            debug!(module = %transformed.id, replacements = rw.replacements, "linked asset references");
            report.replacements += rw.replacements;
            report.rewritten_modules.push(transformed.id.clone());
        }
        *code = rw.code;
    }
    Ok(report)
}
