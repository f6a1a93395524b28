//! Shared test utilities for kiln-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use kiln_bundler::{AssetKind, BuildConfig, BuildResult, ChunkFormat};
use kiln_config::{
    BuildOptions, CacheConfig, Environment, LoaderOptions, LoaderRule, PluginOptions,
};
use serde_json::json;
use tempfile::TempDir;

/// A project on disk.
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn file(self, relative: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
        self
    }

    pub fn dist(&self) -> PathBuf {
        self.root().join("dist")
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.dist().join(relative)).unwrap()
    }

    pub fn config(&self, env: Environment, options: BuildOptions) -> BuildConfig {
        let mut options = options;
        options.apply_environment(env);
        BuildConfig::new(self.root(), env, options)
    }
}

/// entry → a.js → b.css → font.woff
pub fn example_project() -> Project {
    Project::new()
        .file("src/main.js", "import './a.js';\nconsole.log('main');\n")
        .file(
            "src/a.js",
            "import './b.css';\n\nexport const greeting = 'hello';\nconsole.log(greeting);\n",
        )
        .file(
            "src/b.css",
            "@font-face {\n  font-family: Body;\n  src: url(./font.woff);\n}\n\nbody {\n  font-family: Body;\n  margin: 0px;\n}\n",
        )
        // larger than the 1 KiB url limit, so it is emitted as a file
        .file("src/font.woff", vec![7u8; 2048])
}

/// Default rules and resolve options, html and minify plugins, no cache.
pub fn options() -> BuildOptions {
    BuildOptions {
        entry: "src/main.js".into(),
        plugins: vec![
            PluginOptions::new("html", json!({ "filename": "index.html" })),
            PluginOptions::new("minify-css", json!(null)),
            PluginOptions::new("minify-js", json!(null)),
        ],
        cache: CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        },
        ..BuildOptions::default()
    }
}

pub fn script_rule(name: &str, pattern: &str) -> LoaderRule {
    LoaderRule::new(name, &[pattern], AssetKind::Script).loader(LoaderOptions::new("script"))
}

pub fn output_names(result: &BuildResult) -> Vec<String> {
    result.files.iter().map(|f| f.path.clone()).collect()
}

pub fn chunk_file(result: &BuildResult, name: &str, format: ChunkFormat) -> String {
    result
        .graph
        .chunk(name, format)
        .unwrap_or_else(|| panic!("no {} chunk '{}'", format, name))
        .file_name()
}
