//! Compile-time `process.env` replacement.
//!
//! String values are inserted as code, so an env file holding
//! `{ "API": "\"/api\"" }` turns `process.env.API` into `"/api"`. Other JSON
//! values are inserted as their JSON text. `NODE_ENV` defaults to the build
//! environment. Keys that are not defined become `undefined`.

use std::collections::BTreeMap;

use anyhow::Context;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::{BuildPlugin, expand, parse_options};
use crate::{BuildConfig, BuildGraph, ChunkFormat};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DefineOptions {
    /// JSON file of definitions, relative to the project root; may contain `{env}`.
    env_file: Option<String>,
    /// Inline definitions, applied over the file.
    values: BTreeMap<String, Value>,
}

#[derive(Debug)]
pub struct DefinePlugin {
    options: DefineOptions,
    pattern: Regex,
}

impl DefinePlugin {
    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        Ok(Self {
            options: parse_options(options)?,
            pattern: Regex::new(r"process\.env(?:\.([A-Za-z_$][A-Za-z0-9_$]*))?")?,
        })
    }

    fn definitions(&self, config: &BuildConfig) -> anyhow::Result<BTreeMap<String, String>> {
        let mut values: BTreeMap<String, Value> = BTreeMap::new();
        values.insert(
            "NODE_ENV".to_string(),
            Value::String(format!("\"{}\"", config.env().as_str())),
        );

        if let Some(file) = &self.options.env_file {
            let path = config.resolve_path(expand(file, config));
            let text = config
                .runtime()
                .read_to_string(&path)
                .with_context(|| format!("cannot read env file {}", path.display()))?;
            let from_file: BTreeMap<String, Value> = serde_json::from_str(&text)
                .with_context(|| format!("env file {} is not a JSON object", path.display()))?;
            values.extend(from_file);
        }
        values.extend(self.options.values.clone());

        Ok(values
            .into_iter()
            .map(|(key, value)| {
                let code = match value {
                    Value::String(code) => code,
                    other => other.to_string(),
                };
                (key, code)
            })
            .collect())
    }

    fn replace(&self, code: &str, definitions: &BTreeMap<String, String>) -> (String, usize) {
        let mut output = String::with_capacity(code.len());
        let mut last = 0;
        let mut count = 0;

        for caps in self.pattern.captures_iter(code) {
            let Some(whole) = caps.get(0) else { continue };
            let before = code[..whole.start()].chars().next_back();
            let after = code[whole.end()..].chars().next();
            if before.is_some_and(|c| is_ident(c) || c == '.') || after.is_some_and(is_ident) {
                continue;
            }

            let replacement = match caps.get(1) {
                Some(key) => definitions
                    .get(key.as_str())
                    .cloned()
                    .unwrap_or_else(|| "undefined".to_string()),
                None => object_literal(definitions),
            };
            output.push_str(&code[last..whole.start()]);
            output.push_str(&replacement);
            last = whole.end();
            count += 1;
        }
        output.push_str(&code[last..]);
        (output, count)
    }
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn object_literal(definitions: &BTreeMap<String, String>) -> String {
    let fields: Vec<String> = definitions
        .iter()
        .map(|(key, code)| format!("{}: {}", Value::String(key.clone()), code))
        .collect();
    format!("({{ {} }})", fields.join(", "))
}

impl BuildPlugin for DefinePlugin {
    fn name(&self) -> &str {
        "define"
    }

    fn apply(&self, graph: &mut BuildGraph, config: &BuildConfig) -> anyhow::Result<()> {
        let definitions = self.definitions(config)?;
        for chunk in graph.chunks_mut() {
            if chunk.format() != ChunkFormat::Script {
                continue;
            }
            let (code, count) = self.replace(chunk.code(), &definitions);
            if count > 0 {
                tracing::debug!(chunk = %chunk.source_name(), count, "replaced process.env references");
                chunk.set_code(code);
            }
        }
        Ok(())
    }
}
