// src/toolchain/go.rs

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::toolchain::capture::run_captured;
use crate::toolchain::{BuildRequest, BuildResult, ToolFuture, Toolchain};

/// `go` driven through its command line.
///
/// Every invocation runs in the project root with `GOGC=off`, which makes
/// the compiler noticeably faster for short-lived builds.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: String,
    root: PathBuf,
    vendor_command: Vec<String>,
}

impl GoToolchain {
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>, vendor_command: Vec<String>) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            vendor_command,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.program.clone(),
            settings.root.clone(),
            settings.vendor_command.clone(),
        )
    }

    fn command<I, S>(&self, program: &str, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(program);
        cmd.args(args).current_dir(&self.root).env("GOGC", "off");
        cmd
    }

    /// Toolchain version for the startup banner (e.g. `"1.22.3"`).
    pub async fn version(&self) -> Result<String> {
        let output = self
            .command(&self.program, ["version"])
            .output()
            .await
            .with_context(|| format!("running `{} version`", self.program))?;
        if !output.status.success() {
            bail!("`{} version` exited with {}", self.program, output.status);
        }
        let text = String::from_utf8_lossy(&output.stdout);
        Ok(parse_go_version(&text).unwrap_or_else(|| text.trim().to_string()))
    }
}

static GO_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"\bgo(\d+(?:\.\d+)*(?:(?:rc|beta)\d+)?)\b").ok());

/// Extract the version number from `go version` output.
pub fn parse_go_version(text: &str) -> Option<String> {
    GO_VERSION
        .as_ref()?
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl Toolchain for GoToolchain {
    fn has_vendor_dir(&self) -> bool {
        self.root.join("vendor").is_dir()
    }

    fn update_vendor(&self) -> ToolFuture<'_, BuildResult> {
        Box::pin(async move {
            let (program, args) = self
                .vendor_command
                .split_first()
                .ok_or_else(|| anyhow!("vendor command is empty"))?;

            // A stale Godeps manifest makes `godep save` refuse to run.
            let godeps = self.root.join("Godeps");
            match tokio::fs::remove_dir_all(&godeps).await {
                Ok(()) => debug!(path = ?godeps, "removed stale Godeps directory"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(path = ?godeps, error = %e, "failed to remove Godeps directory"),
            }

            run_captured(self.command(program, args), program).await
        })
    }

    fn list_packages(&self) -> ToolFuture<'_, Vec<String>> {
        Box::pin(async move {
            let output = self
                .command(&self.program, ["list", "./..."])
                .output()
                .await
                .with_context(|| format!("running `{} list ./...`", self.program))?;
            if !output.status.success() {
                bail!(
                    "`{} list ./...` failed: {}",
                    self.program,
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }

            // The first entry is the main package itself; it is built by
            // `build`, not installed.
            let packages = String::from_utf8_lossy(&output.stdout)
                .lines()
                .skip(1)
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            Ok(packages)
        })
    }

    fn install<'a>(&'a self, package: &'a str) -> ToolFuture<'a, BuildResult> {
        Box::pin(async move {
            let cmd = self.command(&self.program, ["install", package]);
            run_captured(cmd, &format!("{} install {package}", self.program)).await
        })
    }

    fn build<'a>(&'a self, request: &'a BuildRequest) -> ToolFuture<'a, BuildResult> {
        Box::pin(async move {
            let args = build_args(request);
            let cmd = self.command(&self.program, &args);
            run_captured(cmd, &format!("{} build", self.program)).await
        })
    }
}

/// Arguments for `go build`.
pub fn build_args(request: &BuildRequest) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "-o".to_string(),
        request.artifact.clone(),
    ];
    if let Some(tags) = &request.tags {
        args.push("-tags".to_string());
        args.push(tags.clone());
    }
    if let Some(entry) = &request.entry_point {
        args.push(entry.to_string_lossy().into_owned());
    }
    args
}
