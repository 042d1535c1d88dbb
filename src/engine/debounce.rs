// src/engine/debounce.rs

//! Debounce scheduler: collapses a burst of relevant changes into one
//! rebuild trigger.
//!
//! The pending window is owned by a single task. Every accepted change
//! pushes the deadline out to `event + quiet_period`; when the deadline
//! passes without another change, exactly one trigger is fired and the
//! window goes back to idle.
//!
//! [`PendingWindow`] is the pure state; [`spawn_debouncer`] is the async
//! shell around it.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

use crate::engine::{BuildTrigger, TriggerReason};

/// "Rebuild no earlier than T".
#[derive(Debug, Clone, Copy)]
pub struct PendingWindow {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl PendingWindow {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// Register a change observed at `at`.
    ///
    /// The deadline only ever moves later, so a stale instant delivered out
    /// of order cannot pull it in.
    pub fn extend(&mut self, at: Instant) {
        let candidate = at + self.quiet;
        self.deadline = Some(match self.deadline {
            Some(current) if current > candidate => current,
            _ => candidate,
        });
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Close the window if its deadline has passed. Returns `true` exactly
    /// once per window.
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

/// Cheap, cloneable handle used to report accepted changes.
#[derive(Debug, Clone)]
pub struct DebounceHandle {
    tx: mpsc::UnboundedSender<Instant>,
}

impl DebounceHandle {
    /// Report a relevant change happening now. Never blocks.
    pub fn notify(&self) {
        self.notify_at(Instant::now());
    }

    /// Report a relevant change observed at `at`.
    pub fn notify_at(&self, at: Instant) {
        if self.tx.send(at).is_err() {
            debug!("debounce task is gone; dropping change notification");
        }
    }
}

/// Spawn the debounce task.
///
/// Triggers are delivered on `trigger_tx`. That channel is expected to be
/// bounded to one slot: if a trigger is already waiting, the new one is
/// folded into it (the queued build will see all changes anyway).
pub fn spawn_debouncer(
    quiet: Duration,
    trigger_tx: mpsc::Sender<BuildTrigger>,
) -> (DebounceHandle, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel::<Instant>();
    let handle = tokio::spawn(run_debouncer(PendingWindow::new(quiet), rx, trigger_tx));
    (DebounceHandle { tx }, handle)
}

async fn run_debouncer(
    mut window: PendingWindow,
    mut rx: mpsc::UnboundedReceiver<Instant>,
    trigger_tx: mpsc::Sender<BuildTrigger>,
) {
    debug!(quiet = ?window.quiet_period(), "debounce task started");

    loop {
        let Some(deadline) = window.deadline() else {
            // Idle: wait for the first change of the next burst.
            match rx.recv().await {
                Some(at) => {
                    window.extend(at);
                    continue;
                }
                None => break,
            }
        };

        tokio::select! {
            biased;

            msg = rx.recv() => match msg {
                Some(at) => window.extend(at),
                None => {
                    // No more changes can arrive; still honour the pending
                    // window before stopping.
                    sleep_until(deadline).await;
                    if window.take_if_due(Instant::now()) {
                        fire(&trigger_tx);
                    }
                    break;
                }
            },

            _ = sleep_until(deadline) => {
                if window.take_if_due(Instant::now()) && !fire(&trigger_tx) {
                    break;
                }
            }
        }
    }

    debug!("debounce task finished");
}

/// Returns `false` once the build side has gone away.
fn fire(trigger_tx: &mpsc::Sender<BuildTrigger>) -> bool {
    let trigger = BuildTrigger {
        reason: TriggerReason::FileChange,
    };
    match trigger_tx.try_send(trigger) {
        Ok(()) => {
            info!("quiet period elapsed; scheduling rebuild");
            true
        }
        Err(TrySendError::Full(_)) => {
            debug!("rebuild already pending; coalescing trigger");
            true
        }
        Err(TrySendError::Closed(_)) => {
            debug!("build worker is gone; stopping debounce task");
            false
        }
    }
}
