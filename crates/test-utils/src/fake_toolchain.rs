use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use devloop::toolchain::{BuildRequest, BuildResult, ToolFuture, Toolchain};

/// One recorded call into the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCall {
    UpdateVendor,
    ListPackages,
    Install(String),
    Build(BuildRequest),
}

#[derive(Debug)]
struct FakeState {
    calls: Vec<ToolCall>,
    build_succeeds: bool,
    vendor_succeeds: bool,
    has_vendor_dir: bool,
    packages: Vec<String>,
    failing_install: Option<String>,
    build_delay: Option<Duration>,
    /// `(dir, target)`: a successful build links `dir/<artifact>` to `target`.
    artifact: Option<(PathBuf, PathBuf)>,
}

/// A fake toolchain that:
/// - records every call
/// - succeeds or fails builds as configured
/// - optionally "produces" the artifact as a symlink to a real executable,
///   so the process supervisor has something to start.
///
/// Clones share state, so a test can keep one clone while the pipeline owns
/// another.
#[derive(Debug, Clone)]
pub struct FakeToolchain {
    state: Arc<Mutex<FakeState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for FakeToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeToolchain {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                calls: Vec::new(),
                build_succeeds: true,
                vendor_succeeds: true,
                has_vendor_dir: false,
                packages: Vec::new(),
                failing_install: None,
                build_delay: None,
                artifact: None,
            })),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_build_succeeds(&self, val: bool) {
        self.state.lock().unwrap().build_succeeds = val;
    }

    pub fn with_build_succeeds(self, val: bool) -> Self {
        self.set_build_succeeds(val);
        self
    }

    pub fn with_vendor_dir(self, vendor_succeeds: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.has_vendor_dir = true;
            state.vendor_succeeds = vendor_succeeds;
        }
        self
    }

    pub fn with_packages(self, packages: &[&str]) -> Self {
        self.state.lock().unwrap().packages = packages.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_failing_install(self, package: &str) -> Self {
        self.state.lock().unwrap().failing_install = Some(package.to_string());
        self
    }

    pub fn with_build_delay(self, delay: Duration) -> Self {
        self.state.lock().unwrap().build_delay = Some(delay);
        self
    }

    /// Successful builds link `dir/<artifact>` to `target`.
    pub fn with_artifact(self, dir: &Path, target: &Path) -> Self {
        self.state.lock().unwrap().artifact = Some((dir.to_path_buf(), target.to_path_buf()));
        self
    }

    pub fn calls(&self) -> Vec<ToolCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn build_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ToolCall::Build(_)))
            .count()
    }

    /// Highest number of builds observed running at the same time.
    pub fn max_concurrent_builds(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn record(&self, call: ToolCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

impl Toolchain for FakeToolchain {
    fn has_vendor_dir(&self) -> bool {
        self.state.lock().unwrap().has_vendor_dir
    }

    fn update_vendor(&self) -> ToolFuture<'_, BuildResult> {
        Box::pin(async move {
            self.record(ToolCall::UpdateVendor);
            if self.state.lock().unwrap().vendor_succeeds {
                Ok(BuildResult::succeeded(""))
            } else {
                Ok(BuildResult::failed("godep: no packages"))
            }
        })
    }

    fn list_packages(&self) -> ToolFuture<'_, Vec<String>> {
        Box::pin(async move {
            self.record(ToolCall::ListPackages);
            Ok(self.state.lock().unwrap().packages.clone())
        })
    }

    fn install<'a>(&'a self, package: &'a str) -> ToolFuture<'a, BuildResult> {
        Box::pin(async move {
            self.record(ToolCall::Install(package.to_string()));
            let fails = self.state.lock().unwrap().failing_install.as_deref() == Some(package);
            if fails {
                Ok(BuildResult::failed(format!("cannot install {package}")))
            } else {
                Ok(BuildResult::succeeded(""))
            }
        })
    }

    fn build<'a>(&'a self, request: &'a BuildRequest) -> ToolFuture<'a, BuildResult> {
        Box::pin(async move {
            self.record(ToolCall::Build(request.clone()));

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let delay = self.state.lock().unwrap().build_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let (succeeds, artifact) = {
                let state = self.state.lock().unwrap();
                (state.build_succeeds, state.artifact.clone())
            };
            if !succeeds {
                return Ok(BuildResult::failed("main.go:3:1: syntax error"));
            }
            if let Some((dir, target)) = artifact {
                link_artifact(&dir.join(&request.artifact), &target)?;
            }
            Ok(BuildResult::succeeded(""))
        })
    }
}

#[cfg(unix)]
fn link_artifact(path: &Path, target: &Path) -> anyhow::Result<()> {
    if path.symlink_metadata().is_ok() {
        std::fs::remove_file(path)?;
    }
    std::os::unix::fs::symlink(target, path)?;
    Ok(())
}

#[cfg(not(unix))]
fn link_artifact(path: &Path, target: &Path) -> anyhow::Result<()> {
    std::fs::copy(target, path)?;
    Ok(())
}

/// First existing path among `candidates`, for locating system binaries
/// such as `sleep` or `true`.
pub fn system_binary(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}
