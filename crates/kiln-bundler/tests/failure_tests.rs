//! Builds that must fail, and what they leave behind.

mod helpers;

use helpers::*;
use kiln_bundler::{AssetKind, BuildPhase, Error, build};
use kiln_config::{Environment, LoaderOptions, LoaderRule, PluginOptions};
use serde_json::json;

#[test]
fn static_cycle_is_reported_with_its_path() {
    let project = Project::new()
        .file("src/main.js", "import './a.js';\n")
        .file("src/a.js", "import './b.js';\n")
        .file("src/b.js", "import './a.js';\n");
    let failure = build(&project.config(Environment::Development, options())).unwrap_err();

    assert_eq!(failure.phase, BuildPhase::Discovering);
    match failure.error {
        Error::CyclicDependency { chain } => {
            assert_eq!(chain.to_string(), "src/a.js -> src/b.js -> src/a.js");
        }
        other => panic!("expected a cycle, got {other}"),
    }
    assert!(!project.dist().exists());
}

#[test]
fn unknown_file_type_is_unresolved() {
    let project = Project::new()
        .file("src/main.js", "import data from './data.yaml';\n")
        .file("src/data.yaml", "a: 1\n");
    let failure = build(&project.config(Environment::Development, options())).unwrap_err();
    assert_eq!(failure.error.kind(), "UnresolvedAssetType");
    assert!(failure.to_string().starts_with("discovering failed: UnresolvedAssetType"));
}

#[test]
fn syntax_error_fails_during_discovery() {
    let project = Project::new().file("src/main.js", "const = 1;\n");
    let failure = build(&project.config(Environment::Development, options())).unwrap_err();
    assert_eq!(failure.phase, BuildPhase::Discovering);
    assert_eq!(failure.error.kind(), "TransformError");
}

#[test]
fn failing_loader_step_names_module_and_step() {
    let project = Project::new()
        .file("src/main.js", "import './theme.scss';\n")
        .file("src/theme.scss", "$x: 1;\n");
    let mut options = options();
    options.rules.insert(
        0,
        LoaderRule::new("broken-sass", &[r"\.scss$"], AssetKind::Stylesheet).loader(
            LoaderOptions::with_options(
                "command",
                json!({ "command": "kiln-test-missing-compiler", "args": [] }),
            ),
        ),
    );
    let failure = build(&project.config(Environment::Development, options)).unwrap_err();

    assert_eq!(failure.phase, BuildPhase::Transforming);
    match failure.error {
        Error::TransformError { module, step, .. } => {
            assert_eq!(module, "src/theme.scss");
            assert_eq!(step, "command");
        }
        other => panic!("unexpected {other}"),
    }
    assert!(!project.dist().exists());
}

#[test]
fn missing_external_manifest_is_fatal() {
    let project = example_project();
    let mut options = options();
    options.plugins.push(PluginOptions::new(
        "external-manifest",
        json!({ "manifest": "build/dll/vendor-manifest.json" }),
    ));
    let failure = build(&project.config(Environment::Development, options)).unwrap_err();

    assert_eq!(failure.phase, BuildPhase::PostProcessing);
    assert!(matches!(
        failure.error,
        Error::MissingExternalManifest { ref path } if path.ends_with("build/dll/vendor-manifest.json")
    ));
    assert!(!project.dist().exists());
}

#[test]
fn plugin_failure_names_the_plugin() {
    let project = example_project();
    let mut options = options();
    options.plugins.push(PluginOptions::new(
        "copy",
        json!({ "patterns": [{ "from": "favicon.ico" }] }),
    ));
    let failure = build(&project.config(Environment::Development, options)).unwrap_err();
    assert!(matches!(failure.error, Error::PluginError { ref plugin, .. } if plugin == "copy"));
}

#[test]
fn missing_relative_import_is_not_found() {
    let project = Project::new().file("src/main.js", "import './missing.js';\n");
    let failure = build(&project.config(Environment::Development, options())).unwrap_err();
    assert!(matches!(
        failure.error,
        Error::ModuleNotFound { ref specifier, ref importer }
            if specifier == "./missing.js" && importer == "src/main.js"
    ));
}

#[test]
fn failed_build_keeps_previous_output() {
    let project = example_project();
    let config = project.config(Environment::Development, options());
    build(&config).unwrap();
    let before = std::fs::read_dir(project.dist()).unwrap().count();

    let project = project.file("src/a.js", "import './b.css';\nexport const = ;\n");
    let failure = build(&project.config(Environment::Development, options()))
        .unwrap_err();
    assert_eq!(failure.error.kind(), "TransformError");
    assert_eq!(std::fs::read_dir(project.dist()).unwrap().count(), before);
}

#[test]
fn clean_build_with_broken_template_keeps_previous_output() {
    let project = example_project().file("public/index.html", "<html>{% if %}</html>");
    let config = project.config(Environment::Development, options());
    build(&config).unwrap();
    let before = project.read("index.html");

    let mut options = options();
    options.plugins[0] = PluginOptions::new(
        "html",
        json!({ "filename": "index.html", "template": "public/index.html" }),
    );
    let config = project.config(Environment::Development, options);
    let failure = kiln_bundler::Orchestrator::new(&config)
        .unwrap()
        .with_clean(true)
        .run()
        .unwrap_err();

    assert_eq!(failure.phase, BuildPhase::PostProcessing);
    assert_eq!(project.read("index.html"), before);
}
