// src/engine/pipeline.rs

//! Build pipeline: vendor refresh, warm install, build, restart.
//!
//! [`BuildPipeline::autobuild`] is the build-serialization critical
//! section. The process supervisor lives inside the pipeline's mutex, so
//! holding the lock for the whole run is what guarantees that at most one
//! build executes and that kill/start never interleave with another build.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::BuildTrigger;
use crate::exec::ProcessSupervisor;
use crate::report::{SharedReporter, Tag};
use crate::toolchain::{BuildRequest, BuildResult, Toolchain};

/// What to build and how, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Artifact name, platform suffix included.
    pub app_name: String,
    pub tags: Option<String>,
    pub entry_point: Option<PathBuf>,
    /// Refresh vendored dependencies before building (only when a vendor
    /// directory exists).
    pub vendor: bool,
    /// Install the project's packages before the main build.
    pub warm_install: bool,
}

impl BuildPlan {
    pub fn request(&self) -> BuildRequest {
        BuildRequest {
            artifact: self.app_name.clone(),
            tags: self.tags.clone(),
            entry_point: self.entry_point.clone(),
        }
    }
}

/// Observable result of one [`BuildPipeline::autobuild`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Vendor refresh failed; nothing was built.
    VendorFailed,
    /// The build failed; the running process (if any) was left alone.
    BuildFailed,
    /// The build succeeded but the new artifact could not be started.
    /// The previous instance was already killed.
    StartFailed,
    /// The build succeeded and the new instance is running.
    Restarted { pid: Option<u32> },
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Restarted { .. })
    }
}

pub struct BuildPipeline<T: Toolchain> {
    toolchain: T,
    plan: BuildPlan,
    supervisor: Mutex<ProcessSupervisor>,
    reporter: SharedReporter,
}

impl<T: Toolchain> fmt::Debug for BuildPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildPipeline")
            .field("plan", &self.plan)
            .finish_non_exhaustive()
    }
}

impl<T: Toolchain> BuildPipeline<T> {
    pub fn new(
        toolchain: T,
        plan: BuildPlan,
        supervisor: ProcessSupervisor,
        reporter: SharedReporter,
    ) -> Self {
        Self {
            toolchain,
            plan,
            supervisor: Mutex::new(supervisor),
            reporter,
        }
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Run the full pipeline while holding the build lock.
    pub async fn autobuild(&self) -> BuildOutcome {
        let mut supervisor = self.supervisor.lock().await;
        self.reporter.report(Tag::Info, "Start building...");

        if self.plan.vendor && self.toolchain.has_vendor_dir() {
            self.reporter
                .report(Tag::Info, "Updating vendored dependencies...");
            let result = self.toolchain.update_vendor().await;
            if !self.check(result, "Vendor update failed") {
                return BuildOutcome::VendorFailed;
            }
        }

        if self.plan.warm_install {
            self.warm_install().await;
        }

        let request = self.plan.request();
        let result = self.toolchain.build(&request).await;
        if !self.check(result, "Build failed") {
            return BuildOutcome::BuildFailed;
        }
        self.reporter.report(Tag::Success, "Build was successful");

        match supervisor.restart(&request.artifact).await {
            Ok(pid) => {
                info!(artifact = %request.artifact, pid, "application restarted");
                BuildOutcome::Restarted { pid }
            }
            Err(err) => {
                self.reporter
                    .report(Tag::Error, &format!("Failed to start {}: {err:#}", request.artifact));
                BuildOutcome::StartFailed
            }
        }
    }

    /// Install every listed package in order. The first failure ends the
    /// warm-up with a warning; the build still runs.
    async fn warm_install(&self) {
        let packages = match self.toolchain.list_packages().await {
            Ok(packages) => packages,
            Err(err) => {
                self.reporter
                    .report(Tag::Warn, &format!("Listing packages failed: {err:#}"));
                return;
            }
        };

        for package in &packages {
            debug!(package = %package, "installing package");
            match self.toolchain.install(package).await {
                Ok(result) if result.success => {}
                Ok(result) => {
                    self.reporter.report(
                        Tag::Warn,
                        &format!("Install of {package} failed:\n{}", result.output.trim_end()),
                    );
                    return;
                }
                Err(err) => {
                    self.reporter
                        .report(Tag::Warn, &format!("Install of {package} failed: {err:#}"));
                    return;
                }
            }
        }
    }

    /// Report a failed tool run with the `ERRO` tag. Returns whether the run
    /// succeeded.
    fn check(&self, result: anyhow::Result<BuildResult>, what: &str) -> bool {
        match result {
            Ok(result) if result.success => true,
            Ok(result) => {
                self.reporter
                    .report(Tag::Error, &format!("{what}:\n{}", result.output.trim_end()));
                false
            }
            Err(err) => {
                self.reporter.report(Tag::Error, &format!("{what}: {err:#}"));
                false
            }
        }
    }

    /// Pid of the running application, if any.
    pub async fn current_pid(&self) -> Option<u32> {
        self.supervisor.lock().await.current_pid()
    }

    /// Whether the application started by the last successful build is
    /// still alive.
    pub async fn is_running(&self) -> bool {
        self.supervisor.lock().await.is_running()
    }

    /// Kill the running application. Waits for any in-flight build first.
    pub async fn shutdown(&self) {
        self.supervisor.lock().await.shutdown().await;
    }
}

/// Spawn the build worker: one `autobuild()` per received trigger, strictly
/// one after another.
pub fn spawn_build_worker<T>(
    pipeline: Arc<BuildPipeline<T>>,
    mut trigger_rx: mpsc::Receiver<BuildTrigger>,
) -> JoinHandle<()>
where
    T: Toolchain + 'static,
{
    tokio::spawn(async move {
        info!("build worker started");

        while let Some(trigger) = trigger_rx.recv().await {
            debug!(reason = ?trigger.reason, "build triggered");
            let outcome = pipeline.autobuild().await;
            debug!(?outcome, "build finished");
        }

        info!("build worker finished (channel closed)");
    })
}
