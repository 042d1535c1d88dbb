// src/exec/supervisor.rs

//! Process supervisor: owns the single running application instance.
//!
//! State machine:
//!
//! ```text
//! NoProcess --start--> Running --kill / exit--> NoProcess
//! Running --restart--> (kill, then start) --> Running
//! ```
//!
//! The supervisor is only reachable through the build pipeline's lock, so
//! its operations never interleave.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use thiserror::Error;
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::exec::child::{own_child, ChildExit};
use crate::report::{SharedReporter, Tag};

/// Result of a successful [`ProcessSupervisor::kill`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// There was nothing to kill.
    NoProcess,
    Killed,
}

/// Failure to terminate the current process.
///
/// Every variant is ignorable: the process is gone from the supervisor's
/// point of view either way, and a replacement may be started.
#[derive(Debug, Error)]
pub enum KillError {
    #[error("process {pid:?} had already exited (status {code:?})")]
    AlreadyExited { pid: Option<u32>, code: Option<i32> },

    #[error("failed to terminate process {pid:?}: {source}")]
    Terminate {
        pid: Option<u32>,
        #[source]
        source: std::io::Error,
    },

    #[error("owner task of process {pid:?} failed: {reason}")]
    OwnerLost { pid: Option<u32>, reason: String },
}

/// The currently supervised application instance.
#[derive(Debug)]
struct SupervisedProcess {
    pid: Option<u32>,
    program: PathBuf,
    kill: Option<oneshot::Sender<()>>,
    handle: JoinHandle<ChildExit>,
}

pub struct ProcessSupervisor {
    workdir: PathBuf,
    run_args: Vec<String>,
    current: Option<SupervisedProcess>,
    reporter: SharedReporter,
}

impl std::fmt::Debug for ProcessSupervisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSupervisor")
            .field("workdir", &self.workdir)
            .field("run_args", &self.run_args)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl ProcessSupervisor {
    pub fn new(workdir: impl Into<PathBuf>, run_args: Vec<String>, reporter: SharedReporter) -> Self {
        Self {
            workdir: workdir.into(),
            run_args,
            current: None,
            reporter,
        }
    }

    /// Pid of the current process, if one was started and not killed.
    pub fn current_pid(&self) -> Option<u32> {
        self.current.as_ref().and_then(|p| p.pid)
    }

    /// Program path of the current process.
    pub fn current_program(&self) -> Option<&Path> {
        self.current.as_ref().map(|p| p.program.as_path())
    }

    /// Whether the current process is still alive.
    pub fn is_running(&self) -> bool {
        self.current
            .as_ref()
            .map(|p| !p.handle.is_finished())
            .unwrap_or(false)
    }

    /// Kill the previous instance (ignoring kill failures), then start
    /// `artifact`. The start never begins before the kill attempt is over.
    pub async fn restart(&mut self, artifact: &str) -> Result<Option<u32>> {
        debug!("kill running process");
        match self.kill().await {
            Ok(KillOutcome::Killed) => debug!("previous instance killed"),
            Ok(KillOutcome::NoProcess) => {}
            Err(err) => self.reporter.report(Tag::Warn, &format!("Kill -> {err}")),
        }
        self.start(artifact)
    }

    /// Terminate the current process and wait until its owner task is done.
    pub async fn kill(&mut self) -> std::result::Result<KillOutcome, KillError> {
        let Some(mut process) = self.current.take() else {
            return Ok(KillOutcome::NoProcess);
        };
        let pid = process.pid;

        if let Some(kill) = process.kill.take() {
            if kill.send(()).is_err() {
                debug!(pid, "owner task already finished before kill request");
            }
        }

        let exit = process.handle.await.map_err(|e| KillError::OwnerLost {
            pid,
            reason: e.to_string(),
        })?;

        match exit {
            ChildExit::Killed => Ok(KillOutcome::Killed),
            ChildExit::Exited(code) => Err(KillError::AlreadyExited { pid, code }),
            ChildExit::KillFailed(source) | ChildExit::WaitFailed(source) => {
                Err(KillError::Terminate { pid, source })
            }
        }
    }

    /// Spawn `artifact` and hand it to an owner task.
    ///
    /// Standard output and error are inherited. The call does not wait for
    /// the application.
    pub fn start(&mut self, artifact: &str) -> Result<Option<u32>> {
        let program = normalize_program(Path::new(artifact));
        let display = program.to_string_lossy().into_owned();
        self.reporter
            .report(Tag::Info, &format!("Restarting {display} ..."));

        let mut cmd = Command::new(self.workdir.join(&program));
        cmd.args(&self.run_args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd
            .spawn()
            .with_context(|| format!("starting {display}"))?;
        let pid = child.id();

        let (kill_tx, kill_rx) = oneshot::channel();
        let handle = tokio::spawn(own_child(child, display.clone(), kill_rx));

        self.current = Some(SupervisedProcess {
            pid,
            program,
            kill: Some(kill_tx),
            handle,
        });

        self.reporter
            .report(Tag::Info, &format!("{display} is running..."));
        Ok(pid)
    }

    /// Stop the current process on supervisor exit.
    pub async fn shutdown(&mut self) {
        match self.kill().await {
            Ok(KillOutcome::Killed) => self.reporter.report(Tag::Info, "Application stopped"),
            Ok(KillOutcome::NoProcess) => {}
            Err(err) => debug!(error = %err, "application was not running at shutdown"),
        }
    }
}

/// Make an unqualified program name explicitly relative (`app` → `./app`)
/// so a same-named binary on `PATH` is never picked up instead.
pub fn normalize_program(artifact: &Path) -> PathBuf {
    if artifact.is_absolute() || artifact.components().count() > 1 {
        artifact.to_path_buf()
    } else {
        Path::new(".").join(artifact)
    }
}
