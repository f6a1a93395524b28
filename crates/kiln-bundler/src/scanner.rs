//! Dependency scanning.
//!
//! Scripts are parsed with oxc and walked for `import`/`export ... from`,
//! `import()` and `require()`. Stylesheets are scanned for `@import` and
//! `url()` with regular expressions; Sass sources only report `url()`, since
//! the Sass compiler inlines its own imports.

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, ExportAllDeclaration, ExportNamedDeclaration, Expression,
    ImportDeclaration, ImportExpression,
};
use oxc_ast_visit::{Visit, walk};
use oxc_parser::Parser;
use regex::{Captures, Regex};

use crate::loaders::source_type;
use crate::{AssetKind, DependencyKind, Error, Result};

/// A specifier found in a module, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDependency {
    pub specifier: String,
    pub kind: DependencyKind,
}

impl ScannedDependency {
    pub fn new(specifier: impl Into<String>, kind: DependencyKind) -> Self {
        Self {
            specifier: specifier.into(),
            kind,
        }
    }
}

#[derive(Default)]
struct ImportCollector {
    found: Vec<ScannedDependency>,
}

impl ImportCollector {
    fn push(&mut self, specifier: &str, kind: DependencyKind) {
        let dep = ScannedDependency::new(specifier, kind);
        if !self.found.contains(&dep) {
            self.found.push(dep);
        }
    }
}

impl<'a> Visit<'a> for ImportCollector {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.push(decl.source.value.as_str(), DependencyKind::Import);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if let Some(source) = &decl.source {
            self.push(source.value.as_str(), DependencyKind::Import);
        }
        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_all_declaration(&mut self, decl: &ExportAllDeclaration<'a>) {
        self.push(decl.source.value.as_str(), DependencyKind::Import);
    }

    fn visit_import_expression(&mut self, expr: &ImportExpression<'a>) {
        if let Expression::StringLiteral(lit) = &expr.source {
            self.push(lit.value.as_str(), DependencyKind::Dynamic);
        }
        walk::walk_import_expression(self, expr);
    }

    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name.as_str() == "require" && call.arguments.len() == 1 {
                if let Some(Argument::StringLiteral(lit)) = call.arguments.first() {
                    self.push(lit.value.as_str(), DependencyKind::Import);
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

/// Finds the specifiers a module depends on.
#[derive(Debug, Clone)]
pub struct Scanner {
    css_comment: Regex,
    css_import: Regex,
    css_url: Regex,
}

/// First non-empty alternative of a quoted/unquoted specifier pattern.
fn specifier<'t>(caps: &Captures<'t>) -> Option<&'t str> {
    (1..caps.len())
        .filter_map(|i| caps.get(i))
        .map(|m| m.as_str().trim())
        .find(|s| !s.is_empty())
}

impl Scanner {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| Error::Config(format!("scanner pattern: {}", e)))
        };
        Ok(Self {
            css_comment: compile(r"(?s)/\*.*?\*/")?,
            css_import: compile(
                r#"@import\s+(?:url\(\s*)?(?:"([^"]*)"|'([^']*)'|([^'"\s;)]+))\s*\)?[^;]*;?"#,
            )?,
            css_url: compile(r#"url\(\s*(?:"([^"]*)"|'([^']*)'|([^'")\s]+))\s*\)"#)?,
        })
    }

    /// Specifiers of `source`, in source order without duplicates.
    pub fn scan(&self, id: &str, path: &Path, kind: AssetKind, source: &[u8]) -> Result<Vec<ScannedDependency>> {
        match kind {
            AssetKind::Script => {
                let source = std::str::from_utf8(source)
                    .map_err(|e| Error::transform(id, "parse", format!("input is not valid UTF-8: {}", e)))?;
                self.scan_script(id, path, source)
            }
            AssetKind::Stylesheet => {
                let source = String::from_utf8_lossy(source);
                let sass = matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("scss" | "sass")
                );
                Ok(self.scan_stylesheet(&source, !sass))
            }
            AssetKind::Image | AssetKind::Font => Ok(Vec::new()),
        }
    }

    fn scan_script(&self, id: &str, path: &Path, source: &str) -> Result<Vec<ScannedDependency>> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type(path)).parse();
        if !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::transform(id, "parse", message));
        }

        let mut collector = ImportCollector::default();
        collector.visit_program(&ret.program);
        Ok(collector.found)
    }

    fn scan_stylesheet(&self, source: &str, imports: bool) -> Vec<ScannedDependency> {
        let source = self.css_comment.replace_all(source, "");
        let mut found: Vec<(usize, ScannedDependency)> = Vec::new();
        let mut import_spans = Vec::new();

        for caps in self.css_import.captures_iter(&source) {
            let Some(whole) = caps.get(0) else { continue };
            import_spans.push(whole.range());
            if !imports {
                continue;
            }
            if let Some(spec) = specifier(&caps) {
                found.push((whole.start(), ScannedDependency::new(spec, DependencyKind::Import)));
            }
        }

        for caps in self.css_url.captures_iter(&source) {
            let Some(whole) = caps.get(0) else { continue };
            if import_spans.iter().any(|span| span.contains(&whole.start())) {
                continue;
            }
            if let Some(spec) = specifier(&caps) {
                found.push((whole.start(), ScannedDependency::new(spec, DependencyKind::Url)));
            }
        }

        found.sort_by_key(|(pos, _)| *pos);
        let mut out: Vec<ScannedDependency> = Vec::new();
        for (_, dep) in found {
            if !out.contains(&dep) {
                out.push(dep);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(name: &str, kind: AssetKind, source: &str) -> Result<Vec<ScannedDependency>> {
        Scanner::new()
            .unwrap()
            .scan(name, Path::new(name), kind, source.as_bytes())
    }

    fn specs(deps: &[ScannedDependency]) -> Vec<(&str, DependencyKind)> {
        deps.iter().map(|d| (d.specifier.as_str(), d.kind)).collect()
    }

    #[test]
    fn finds_script_imports() {
        let source = r#"
            import React from 'react';
            import './b.css';
            export { x } from "./x";
            export * from './y';
            const lazy = () => import('./lazy');
            const font = require('./font.woff');
            const App = () => <div className="app" />;
        "#;
        let deps = scan("src/a.jsx", AssetKind::Script, source).unwrap();
        assert_eq!(
            specs(&deps),
            vec![
                ("react", DependencyKind::Import),
                ("./b.css", DependencyKind::Import),
                ("./x", DependencyKind::Import),
                ("./y", DependencyKind::Import),
                ("./lazy", DependencyKind::Dynamic),
                ("./font.woff", DependencyKind::Import),
            ]
        );
    }

    #[test]
    fn ignores_computed_imports() {
        let deps = scan("src/a.js", AssetKind::Script, "import(name); require(`./${x}`);").unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn script_parse_error_is_a_transform_error() {
        let err = scan("src/a.js", AssetKind::Script, "import {").unwrap_err();
        assert!(matches!(err, Error::TransformError { ref step, .. } if step == "parse"));
    }

    #[test]
    fn finds_stylesheet_references() {
        let source = r#"
            @import "./reset.css";
            @import url('theme.css') screen;
            /* url(ignored.png) */
            @font-face { src: url(./font.woff) format("woff"), url("./font.woff"); }
            .logo { background: url( 'logo.png' ); }
            .inline { background: url(data:image/png;base64,AAAA); }
        "#;
        let deps = scan("src/b.css", AssetKind::Stylesheet, source).unwrap();
        assert_eq!(
            specs(&deps),
            vec![
                ("./reset.css", DependencyKind::Import),
                ("theme.css", DependencyKind::Import),
                ("./font.woff", DependencyKind::Url),
                ("logo.png", DependencyKind::Url),
                ("data:image/png;base64,AAAA", DependencyKind::Url),
            ]
        );
    }

    #[test]
    fn sass_reports_urls_only() {
        let source = "@import 'variables';\n.a { background: url(./bg.png); }\n";
        let deps = scan("src/a.scss", AssetKind::Stylesheet, source).unwrap();
        assert_eq!(specs(&deps), vec![("./bg.png", DependencyKind::Url)]);
    }

    #[test]
    fn binary_assets_have_no_dependencies() {
        let deps = Scanner::new()
            .unwrap()
            .scan("a.png", Path::new("a.png"), AssetKind::Image, &[0x89, 0x50])
            .unwrap();
        assert!(deps.is_empty());
    }
}
