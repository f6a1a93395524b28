//! End-to-end builds on disk.

mod helpers;

use helpers::*;
use kiln_bundler::{ChunkFormat, build};
use kiln_config::{BuildOptions, Environment};

#[test]
fn example_graph_produces_expected_output() {
    let project = example_project();
    let config = project.config(Environment::Development, options());
    let result = build(&config).unwrap();

    let js: Vec<_> = result
        .graph
        .chunks()
        .iter()
        .filter(|c| c.format() == ChunkFormat::Script)
        .collect();
    let css: Vec<_> = result
        .graph
        .chunks()
        .iter()
        .filter(|c| c.format() == ChunkFormat::Style)
        .collect();
    assert_eq!(js.len(), 1);
    assert_eq!(css.len(), 1);

    let names = output_names(&result);
    let fonts: Vec<_> = names.iter().filter(|n| n.starts_with("assets/fonts/")).collect();
    assert_eq!(fonts.len(), 1);
    let font = fonts[0];
    let hash = font
        .trim_start_matches("assets/fonts/font.")
        .trim_end_matches(".woff");
    assert_eq!(hash.len(), 8);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

    let html = project.read("index.html");
    assert!(html.contains(&chunk_file(&result, "main", ChunkFormat::Script)));
    assert!(html.contains(&chunk_file(&result, "main", ChunkFormat::Style)));

    let stylesheet = project.read(&chunk_file(&result, "main", ChunkFormat::Style));
    assert!(stylesheet.contains(&format!("../{}", font)));
}

#[test]
fn unminified_output_keeps_sources_readable() {
    let project = example_project();
    let options = BuildOptions {
        minify: Some(false),
        source_maps: Some(false),
        css_source_maps: Some(false),
        ..options()
    };
    let result = build(&project.config(Environment::Production, options)).unwrap();

    let script = project.read(&chunk_file(&result, "main", ChunkFormat::Script));
    assert!(script.starts_with("// src/a.js\n"));
    assert!(script.contains("export const greeting = 'hello';\nconsole.log(greeting);\n"));
    assert!(script.contains("// src/main.js\n"));
    // stylesheet import is dropped from the script
    assert!(!script.contains("b.css"));

    let stylesheet = project.read(&chunk_file(&result, "main", ChunkFormat::Style));
    assert!(stylesheet.starts_with("/* src/b.css */\n"));
    assert!(stylesheet.contains("font-family: Body;"));
    assert!(!stylesheet.contains("sourceMappingURL"));
}

#[test]
fn minified_output_is_smaller() {
    let plain = example_project();
    let plain_result = build(&plain.config(
        Environment::Production,
        BuildOptions {
            minify: Some(false),
            ..options()
        },
    ))
    .unwrap();

    let minified = example_project();
    let minified_result = build(&minified.config(Environment::Production, options())).unwrap();

    for format in [ChunkFormat::Script, ChunkFormat::Style] {
        let before = plain_result.graph.chunk("main", format).unwrap().size();
        let after = minified_result.graph.chunk("main", format).unwrap().size();
        assert!(after < before, "{} chunk: {} >= {}", format, after, before);
    }
    let stylesheet = minified.read(&chunk_file(&minified_result, "main", ChunkFormat::Style));
    assert!(!stylesheet.contains("/* src/b.css */"));
}

#[test]
fn development_builds_emit_source_maps() {
    let project = example_project();
    let result = build(&project.config(Environment::Development, options())).unwrap();

    let script_file = chunk_file(&result, "main", ChunkFormat::Script);
    let names = output_names(&result);
    assert!(names.contains(&format!("{}.map", script_file)));

    let script = project.read(&script_file);
    let map_name = script_file.trim_start_matches("js/");
    assert!(script.ends_with(&format!("//# sourceMappingURL={}.map\n", map_name)));

    let map: serde_json::Value =
        serde_json::from_str(&project.read(&format!("{}.map", script_file))).unwrap();
    assert_eq!(map["sources"], serde_json::json!(["src/a.js", "src/main.js"]));
}

#[test]
fn small_images_are_inlined() {
    let project = Project::new()
        .file("src/main.js", "import logo from './logo.png';\ndocument.body.append(logo);\n")
        .file("src/logo.png", [137u8, 80, 78, 71]);
    let result = build(&project.config(Environment::Production, BuildOptions {
        minify: Some(false),
        ..options()
    }))
    .unwrap();

    let script = project.read(&chunk_file(&result, "main", ChunkFormat::Script));
    assert!(script.contains("const logo = \"data:image/png;base64,"));
    assert!(!output_names(&result).iter().any(|n| n.contains("logo")));
}

#[test]
fn aliases_and_extensions_resolve() {
    let project = Project::new()
        .file("src/main.js", "import { util } from '@/lib/util';\nutil();\n")
        .file("src/lib/util.js", "export function util() {}\n");
    let result = build(&project.config(Environment::Development, options())).unwrap();
    assert_eq!(result.graph.modules().len(), 2);
}

#[test]
fn dynamic_imports_become_async_chunks_not_in_html() {
    let project = Project::new()
        .file("src/main.js", "import('./page.js').then(m => m.render());\n")
        .file("src/page.js", "export function render() {}\n");
    let result = build(&project.config(Environment::Development, options())).unwrap();

    let page = chunk_file(&result, "page", ChunkFormat::Script);
    assert!(project.dist().join(&page).exists());
    assert!(!project.read("index.html").contains(&page));
}

#[test]
fn packages_land_in_vendor_chunk() {
    let project = Project::new()
        .file("src/main.js", "import React from 'react';\nReact.render();\n")
        .file("node_modules/react/package.json", r#"{ "main": "index.js" }"#)
        .file("node_modules/react/index.js", "export default { render() {} };\n");
    let result = build(&project.config(Environment::Development, options())).unwrap();

    let vendors = result.graph.chunk("vendors", ChunkFormat::Script).unwrap();
    assert_eq!(vendors.modules()[0].as_str(), "node_modules/react/index.js");

    let html = project.read("index.html");
    let vendor_at = html.find(&vendors.file_name()).unwrap();
    let main_at = html.find(&chunk_file(&result, "main", ChunkFormat::Script)).unwrap();
    assert!(vendor_at < main_at);
}

#[test]
fn out_dir_override_and_clean() {
    let project = example_project().file("out/stale.txt", "old");
    let options = BuildOptions {
        output_dir: "out".into(),
        ..options()
    };
    let config = project.config(Environment::Development, options);
    let result = kiln_bundler::Orchestrator::new(&config)
        .unwrap()
        .with_clean(true)
        .run()
        .unwrap();
    assert_eq!(result.output_dir, project.root().join("out"));
    assert!(project.root().join("out/index.html").exists());
    assert!(!project.root().join("out/stale.txt").exists());
}
