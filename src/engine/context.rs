// src/engine/context.rs

//! The supervisor context: everything one `devloop run` owns, created once
//! at startup and passed explicitly to whoever needs it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::engine::debounce::{spawn_debouncer, DebounceHandle};
use crate::engine::pipeline::{spawn_build_worker, BuildPipeline};
use crate::engine::{BuildTrigger, TriggerReason};
use crate::toolchain::Toolchain;

/// Pending builds beyond the running one. A trigger arriving while this
/// slot is taken is coalesced into it.
const TRIGGER_SLOTS: usize = 1;

#[derive(Debug)]
pub struct SupervisorContext<T: Toolchain + 'static> {
    pipeline: Arc<BuildPipeline<T>>,
    debouncer: DebounceHandle,
    trigger_tx: mpsc::Sender<BuildTrigger>,
    worker: JoinHandle<()>,
    debounce_task: JoinHandle<()>,
}

impl<T: Toolchain + 'static> SupervisorContext<T> {
    /// Start the build worker and the debounce task. Must be called from
    /// within a Tokio runtime.
    pub fn start(pipeline: Arc<BuildPipeline<T>>, quiet_period: Duration) -> Self {
        let (trigger_tx, trigger_rx) = mpsc::channel(TRIGGER_SLOTS);
        let worker = spawn_build_worker(Arc::clone(&pipeline), trigger_rx);
        let (debouncer, debounce_task) = spawn_debouncer(quiet_period, trigger_tx.clone());

        Self {
            pipeline,
            debouncer,
            trigger_tx,
            worker,
            debounce_task,
        }
    }

    /// Handle for reporting accepted changes.
    pub fn debouncer(&self) -> DebounceHandle {
        self.debouncer.clone()
    }

    pub fn pipeline(&self) -> &Arc<BuildPipeline<T>> {
        &self.pipeline
    }

    /// Queue a build without going through the debounce window.
    ///
    /// Returns `false` only when the build worker is gone. A request made
    /// while another build is already pending is folded into it.
    pub fn request_build(&self, reason: TriggerReason) -> bool {
        match self.trigger_tx.try_send(BuildTrigger { reason }) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(?reason, "build already pending; coalescing request");
                true
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Stop the background tasks, then kill the running application.
    ///
    /// An in-flight build is abandoned; toolchain children die with it.
    pub async fn shutdown(self) {
        self.debounce_task.abort();
        self.worker.abort();
        // Aborted tasks report a cancellation error; only completion matters.
        let _ = self.debounce_task.await;
        let _ = self.worker.await;
        self.pipeline.shutdown().await;
    }
}
