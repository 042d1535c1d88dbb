// src/exec/child.rs

//! Owner task for one supervised child process.

use tokio::process::Child;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// How the owner task ended.
#[derive(Debug)]
pub enum ChildExit {
    /// The process exited on its own (normal exit or crash).
    Exited(Option<i32>),
    /// A kill request was honoured.
    Killed,
    /// The kill request could not be carried out.
    KillFailed(std::io::Error),
    /// Waiting on the process failed.
    WaitFailed(std::io::Error),
}

/// Hold `child` until it exits or a kill request arrives on `kill_rx`.
///
/// Nothing restarts a child that exits on its own; the next successful
/// build does.
pub async fn own_child(
    mut child: Child,
    program: String,
    kill_rx: oneshot::Receiver<()>,
) -> ChildExit {
    let pid = child.id();

    tokio::select! {
        status = child.wait() => match status {
            Ok(status) => {
                info!(
                    program = %program,
                    pid,
                    exit_code = status.code(),
                    success = status.success(),
                    "application exited"
                );
                ChildExit::Exited(status.code())
            }
            Err(e) => {
                warn!(program = %program, pid, error = %e, "failed to wait for application");
                ChildExit::WaitFailed(e)
            }
        },

        request = kill_rx => {
            if request.is_err() {
                debug!(program = %program, pid, "supervisor dropped; killing application");
            }
            match child.kill().await {
                Ok(()) => {
                    debug!(program = %program, pid, "application killed");
                    ChildExit::Killed
                }
                Err(e) => ChildExit::KillFailed(e),
            }
        }
    }
}
