// src/toolchain/mod.rs

//! Build tool abstraction.
//!
//! The build pipeline talks to a [`Toolchain`] instead of spawning commands
//! itself, so tests can swap in a fake that records calls and decides the
//! outcome. [`GoToolchain`] is the production implementation.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use anyhow::Result;

pub mod capture;
pub mod go;

pub use go::GoToolchain;

/// Boxed future returned by [`Toolchain`] methods.
pub type ToolFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// What to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Output artifact name, including any platform suffix.
    pub artifact: String,
    /// Build tags passed through verbatim.
    pub tags: Option<String>,
    /// Explicit entry point; `None` builds the current package.
    pub entry_point: Option<PathBuf>,
}

/// Result of one toolchain invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildResult {
    pub success: bool,
    /// Captured stdout followed by stderr.
    pub output: String,
}

impl BuildResult {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failed(output: impl Into<String>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// The external build collaborator.
///
/// `Err` means the tool could not be run at all; a tool that ran and
/// reported failure yields `Ok` with `success == false`.
pub trait Toolchain: Send + Sync {
    /// Whether the project has a vendor directory worth refreshing.
    fn has_vendor_dir(&self) -> bool;

    /// Refresh vendored dependencies.
    fn update_vendor(&self) -> ToolFuture<'_, BuildResult>;

    /// Installable packages of the project, in install order.
    fn list_packages(&self) -> ToolFuture<'_, Vec<String>>;

    /// Install one package to warm the build cache.
    fn install<'a>(&'a self, package: &'a str) -> ToolFuture<'a, BuildResult>;

    /// Build the artifact.
    fn build<'a>(&'a self, request: &'a BuildRequest) -> ToolFuture<'a, BuildResult>;
}
