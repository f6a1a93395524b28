use std::fs;
use std::path::PathBuf;

use kiln_config::{Environment, SplitPolicy};
use tempfile::TempDir;

use crate::config::{Overrides, ProjectConfig};
use crate::error::{CliError, ConfigError};

fn project(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }
    dir
}

#[test]
fn defaults_without_a_file() {
    let dir = project(&[]);
    let loaded = ProjectConfig::load(dir.path(), None).unwrap();
    assert!(loaded.file.is_none());
    assert_eq!(loaded.source(), "defaults");
    assert_eq!(loaded.config.build.entry, PathBuf::from("src/main.jsx"));
    assert!(loaded.show_summary());
}

#[test]
fn discovered_file_overrides_defaults() {
    let dir = project(&[(
        "kiln.toml",
        r#"
[build]
entry = "src/index.js"
output_dir = "public"

[build.split]
policy = "single"

[settings]
title = "Shop"
summary = false
"#,
    )]);

    let loaded = ProjectConfig::load(dir.path(), None).unwrap();
    assert_eq!(loaded.source(), "kiln.toml");
    assert_eq!(loaded.config.build.entry, PathBuf::from("src/index.js"));
    assert_eq!(loaded.config.build.split.policy, SplitPolicy::Single);
    assert_eq!(loaded.config.build.split.min_chunks, 2);
    assert!(!loaded.config.build.rules.is_empty());
    assert!(!loaded.show_summary());

    let config = loaded
        .build_config(Environment::Production, &Overrides::default())
        .unwrap();
    assert_eq!(config.title(), "Shop");
    assert_eq!(config.output_dir(), dir.path().join("public"));
}

#[test]
fn profile_then_flags() {
    let dir = project(&[(
        "kiln.toml",
        r#"
[build]
output_dir = "dist"

[profiles.production.build]
output_dir = "release"
minify = false
"#,
    )]);
    let loaded = ProjectConfig::load(dir.path(), None).unwrap();

    let production = loaded
        .build_config(Environment::Production, &Overrides::default())
        .unwrap();
    assert_eq!(production.output_dir(), dir.path().join("release"));
    assert!(!production.minify());
    assert!(!production.options().source_maps());

    let flagged = loaded
        .build_config(
            Environment::Production,
            &Overrides {
                out_dir: Some(PathBuf::from("out")),
            },
        )
        .unwrap();
    assert_eq!(flagged.output_dir(), dir.path().join("out"));

    let development = loaded
        .build_config(Environment::Development, &Overrides::default())
        .unwrap();
    assert_eq!(development.output_dir(), dir.path().join("dist"));
    assert!(development.options().source_maps());
}

#[test]
fn plugin_list_is_replaced_wholesale() {
    let dir = project(&[(
        "kiln.toml",
        r#"
[[build.plugins]]
name = "html"
"#,
    )]);
    let loaded = ProjectConfig::load(dir.path(), None).unwrap();
    let names: Vec<_> = loaded.config.build.plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["html"]);
}

#[test]
fn package_json_field_is_used() {
    let dir = project(&[(
        "package.json",
        r#"{ "name": "app", "kiln": { "build": { "entry": "web/app.js" } } }"#,
    )]);
    let loaded = ProjectConfig::load(dir.path(), None).unwrap();
    assert_eq!(loaded.source(), "package.json");
    assert_eq!(loaded.config.build.entry, PathBuf::from("web/app.js"));
}

#[test]
fn explicit_config_path() {
    let dir = project(&[("config/web.toml", "[build]\nentry = \"src/web.js\"\n")]);
    let loaded = ProjectConfig::load(dir.path(), Some("config/web.toml".as_ref())).unwrap();
    assert_eq!(loaded.config.build.entry, PathBuf::from("src/web.js"));

    let err = ProjectConfig::load(dir.path(), Some("missing.toml".as_ref())).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
}

#[test]
fn invalid_toml_is_a_config_error() {
    let dir = project(&[("kiln.toml", "[build\n")]);
    let err = ProjectConfig::load(dir.path(), None).unwrap_err();
    assert!(matches!(err, CliError::Config(ConfigError::Invalid(_))));
    assert_eq!(err.exit_code(), crate::error::EXIT_USAGE);
}

#[test]
fn wrong_field_type_names_the_field() {
    let dir = project(&[("kiln.toml", "[build]\nconcurrency = \"many\"\n")]);
    let err = ProjectConfig::load(dir.path(), None).unwrap_err();
    match err {
        CliError::Config(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "build.concurrency")
        }
        other => panic!("unexpected error: {other}"),
    }
}
