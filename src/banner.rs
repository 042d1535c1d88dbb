// src/banner.rs

//! Startup banner.

use crate::config::Settings;
use crate::report::{Reporter, Tag};
use crate::toolchain::GoToolchain;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn print_version() {
    println!("devloop {VERSION}");
}

/// Print our version, the toolchain version and the watched extensions.
///
/// A toolchain that cannot report its version is only a warning here; the
/// first build will surface the real problem.
pub async fn print_banner(toolchain: &GoToolchain, settings: &Settings, reporter: &dyn Reporter) {
    println!("devloop : {VERSION}");
    match toolchain.version().await {
        Ok(version) => println!("Go      : {version}"),
        Err(err) => reporter.report(Tag::Warn, &format!("Cannot determine Go version: {err:#}")),
    }
    println!("Ext     : {:?}", settings.extensions);
    println!();
}
