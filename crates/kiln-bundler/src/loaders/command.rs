use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use super::{Content, Loader, LoaderContext};

/// Pipes the module through an external program (stdin to stdout).
///
/// `{file}` and `{dir}` in arguments expand to the module's path and its
/// directory, e.g. `["--stdin", "--load-path={dir}"]` for `sass`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandLoader {
    command: String,
    #[serde(default)]
    args: Vec<String>,
}

impl CommandLoader {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_options(options: &Value) -> anyhow::Result<Self> {
        let loader: Self = serde_json::from_value(options.clone())?;
        if loader.command.trim().is_empty() {
            anyhow::bail!("'command' cannot be empty");
        }
        Ok(loader)
    }

    fn expand_args(&self, cx: &LoaderContext<'_>) -> Vec<String> {
        let file = cx.module.path().to_string_lossy();
        let dir = cx
            .module
            .path()
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.args
            .iter()
            .map(|arg| arg.replace("{file}", &file).replace("{dir}", &dir))
            .collect()
    }
}

impl Loader for CommandLoader {
    fn name(&self) -> &str {
        "command"
    }

    fn transform(&self, input: Content, cx: &LoaderContext<'_>) -> anyhow::Result<Content> {
        let input = input.into_bytes()?;
        let mut child = Command::new(&self.command)
            .args(self.expand_args(cx))
            .current_dir(cx.config.root())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start '{}'", self.command))?;

        // Write from a separate thread so a full stdout pipe cannot block us.
        let mut stdin = child.stdin.take().context("child stdin unavailable")?;
        let writer = thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .with_context(|| format!("failed to wait for '{}'", self.command))?;
        let written = writer.join();

        if !output.status.success() {
            anyhow::bail!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        check_stdin(&self.command, written)?;

        let stdout = String::from_utf8(output.stdout)
            .with_context(|| format!("'{}' produced invalid UTF-8", self.command))?;
        Ok(Content::Text(stdout))
    }
}

/// Outcome of feeding the module to the child, checked once it exited 0.
///
/// A closed pipe only means the tool stopped reading early; any other write
/// failure means it saw truncated input.
fn check_stdin(command: &str, written: thread::Result<io::Result<()>>) -> anyhow::Result<()> {
    match written {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        Ok(Err(e)) => Err(e).with_context(|| format!("cannot write input to '{}'", command)),
        Err(_) => anyhow::bail!("input writer for '{}' panicked", command),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::BuildConfig;
    use kiln_config::{BuildOptions, Environment};
    use kiln_graph::{AssetKind, Module, ModuleId};
    use serde_json::json;
    use tempfile::TempDir;

    fn run(loader: &CommandLoader, input: &str) -> anyhow::Result<Content> {
        let dir = TempDir::new().unwrap();
        let module = Module::builder(
            ModuleId::new("src/a.scss").unwrap(),
            dir.path().join("src/a.scss"),
            AssetKind::Stylesheet,
        )
        .build();
        let config = BuildConfig::new(dir.path(), Environment::Development, BuildOptions::default());
        let cx = LoaderContext {
            module: &module,
            config: &config,
            rule: "sass",
        };
        loader.transform(Content::Text(input.to_string()), &cx)
    }

    #[test]
    fn pipes_through_command() {
        let loader = CommandLoader::from_options(&json!({ "command": "cat" })).unwrap();
        assert_eq!(run(&loader, "a { b: c }").unwrap(), Content::Text("a { b: c }".into()));
    }

    #[test]
    fn non_zero_exit_is_an_error() {
        let loader = CommandLoader::new("sh", vec!["-c".into(), "echo nope >&2; exit 3".into()]);
        let err = run(&loader, "").unwrap_err().to_string();
        assert!(err.contains("nope"), "{err}");
    }

    #[test]
    fn missing_program_is_an_error() {
        let loader = CommandLoader::new("kiln-definitely-not-installed", Vec::new());
        let err = run(&loader, "").unwrap_err().to_string();
        assert!(err.contains("failed to start"));
    }

    #[test]
    fn expands_dir_placeholder() {
        let loader = CommandLoader::new("sh", vec!["-c".into(), "printf %s \"$0\"".into(), "{dir}".into()]);
        let Content::Text(out) = run(&loader, "").unwrap() else {
            panic!("expected text");
        };
        assert!(out.ends_with("/src"), "{out}");
    }

    #[test]
    fn stdin_write_failure_is_an_error() {
        let err = check_stdin("sass", Ok(Err(io::Error::other("disk full")))).unwrap_err();
        assert!(format!("{:#}", err).contains("cannot write input to 'sass': disk full"));

        let closed = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        assert!(check_stdin("sass", Ok(Err(closed))).is_ok());
        assert!(check_stdin("sass", Ok(Ok(()))).is_ok());
    }

    #[test]
    fn tool_that_ignores_stdin_still_succeeds() {
        let loader = CommandLoader::new("sh", vec!["-c".into(), "printf ok".into()]);
        let input = "x".repeat(1 << 20);
        assert_eq!(run(&loader, &input).unwrap(), Content::Text("ok".into()));
    }

    #[test]
    fn empty_command_is_rejected() {
        assert!(CommandLoader::from_options(&json!({ "command": " " })).is_err());
        assert!(CommandLoader::from_options(&json!({ "args": [] })).is_err());
    }
}
