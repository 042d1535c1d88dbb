// src/toolchain/capture.rs

//! Run a tool, streaming its output to ours while capturing it.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::toolchain::BuildResult;

#[derive(Debug, Clone, Copy)]
enum Sink {
    Stdout,
    Stderr,
}

/// Spawn `cmd`, echo every stdout/stderr line to our own stdout/stderr and
/// return the exit status together with the captured text.
pub async fn run_captured(mut cmd: Command, label: &str) -> Result<BuildResult> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!(tool = %label, "running toolchain command");

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {label}"))?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out, err, status) = tokio::join!(
        forward_lines(stdout, Sink::Stdout),
        forward_lines(stderr, Sink::Stderr),
        child.wait(),
    );

    let status = status.with_context(|| format!("waiting for {label}"))?;
    debug!(tool = %label, code = ?status.code(), "toolchain command exited");

    Ok(BuildResult {
        success: status.success(),
        output: out + &err,
    })
}

async fn forward_lines<R>(reader: Option<R>, sink: Sink) -> String
where
    R: AsyncRead + Unpin,
{
    let mut captured = String::new();
    let Some(reader) = reader else {
        return captured;
    };

    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match sink {
            Sink::Stdout => println!("{line}"),
            Sink::Stderr => eprintln!("{line}"),
        }
        captured.push_str(&line);
        captured.push('\n');
    }
    captured
}
