// src/watch/watcher.rs

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::DebounceHandle;
use crate::errors::{DevloopError, Result};
use crate::report::{Reporter, SharedReporter, Tag};
use crate::types::WatchRoot;
use crate::watch::filter::{ChangeFilter, Verdict};

/// Handle for the filesystem watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    listener: JoinHandle<()>,
    roots: usize,
}

impl WatcherHandle {
    /// Number of subscribed watch roots.
    pub fn root_count(&self) -> usize {
        self.roots
    }

    /// Stop watching and wait for the listener task to end.
    pub async fn stop(self) {
        let WatcherHandle {
            _inner: watcher,
            listener,
            ..
        } = self;
        drop(watcher);
        listener.abort();
        if let Err(err) = listener.await {
            if !err.is_cancelled() {
                debug!(error = %err, "watch listener ended abnormally");
            }
        }
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Subscribe every root (non-recursively) and spawn the listener task that
/// feeds notifications through `filter` into `debouncer`.
///
/// Failing to create the watcher or to subscribe any root is fatal; watch
/// errors reported later are logged and the listener keeps going.
pub fn spawn_watcher(
    roots: &[WatchRoot],
    mut filter: ChangeFilter,
    debouncer: DebounceHandle,
    reporter: SharedReporter,
) -> Result<WatcherHandle> {
    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            if let Err(err) = event_tx.send(res) {
                // The listener is gone; nothing left to deliver to.
                eprintln!("devloop: failed to forward notify event: {err}");
            }
        },
        Config::default(),
    )
    .map_err(DevloopError::WatcherInit)?;

    for root in roots {
        watcher
            .watch(&root.dir, RecursiveMode::NonRecursive)
            .map_err(|source| DevloopError::WatchRoot {
                path: root.dir.clone(),
                source,
            })?;
        reporter.report(Tag::Trace, &format!("Watching {root}"));
    }

    info!(roots = roots.len(), "file watcher started");

    let listener = tokio::spawn(async move {
        while let Some(res) = event_rx.recv().await {
            match res {
                Ok(event) => {
                    handle_event(&mut filter, &debouncer, reporter.as_ref(), event);
                }
                Err(err) => reporter.report(Tag::Warn, &format!("Watcher error: {err}")),
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        listener,
        roots: roots.len(),
    })
}

/// Run every path of `event` through the filter. Accepted paths are
/// reported with `EVEN` and notify the debouncer; duplicates are reported
/// with `SKIP`.
///
/// Returns `true` when at least one path was accepted.
pub fn handle_event(
    filter: &mut ChangeFilter,
    debouncer: &DebounceHandle,
    reporter: &dyn Reporter,
    event: Event,
) -> bool {
    debug!(?event, "received notify event");

    let mut accepted = false;
    for path in &event.paths {
        match filter.check(path, &event.kind) {
            Verdict::Accept => {
                reporter.report(Tag::Event, &format!("{:?}: {}", event.kind, path.display()));
                debouncer.notify();
                accepted = true;
            }
            Verdict::Duplicate => {
                reporter.report(Tag::Skip, &format!("{:?}: {}", event.kind, path.display()));
            }
            other => debug!(path = %path.display(), verdict = ?other, "ignoring change"),
        }
    }
    accepted
}
