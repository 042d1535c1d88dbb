// src/lib.rs

pub mod banner;
pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod report;
pub mod toolchain;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::{CliArgs, CliCommand};
use crate::config::{load_or_default, Settings};
use crate::discover::discover_watch_roots;
use crate::engine::{BuildPipeline, SupervisorContext, TriggerReason};
use crate::errors::{DevloopError, Result};
use crate::exec::ProcessSupervisor;
use crate::fs::{FileSystem, RealFileSystem};
use crate::report::{Reporter, SharedReporter, Tag, TracingReporter};
use crate::toolchain::GoToolchain;
use crate::types::WatchRoot;
use crate::watch::{spawn_watcher, ChangeFilter};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - watch-root discovery
/// - the build pipeline, process supervisor and debounce scheduler
/// - the file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let run_args = match args.command {
        CliCommand::Version => {
            banner::print_version();
            return Ok(());
        }
        CliCommand::Run(run_args) => run_args,
    };

    let cwd = std::env::current_dir()?;
    let root = cwd.canonicalize().unwrap_or(cwd);
    let cfg = load_or_default(args.config.as_deref(), &root)?;
    let settings = Settings::resolve(&cfg, &run_args, root)?;
    debug!(?settings, "resolved settings");

    let reporter: SharedReporter = Arc::new(TracingReporter);
    let toolchain = GoToolchain::from_settings(&settings);
    banner::print_banner(&toolchain, &settings, reporter.as_ref()).await;

    reporter.report(
        Tag::Info,
        &format!("Uses '{}' as 'appname'", settings.plan.app_name),
    );
    warn_on_app_name_conflict(&RealFileSystem, &settings, reporter.as_ref());

    let roots = discover_watch_roots(
        &RealFileSystem,
        &settings.root,
        &settings.extensions,
        &settings.exclusions,
    );
    if roots.is_empty() {
        return Err(DevloopError::NoWatchRoots(settings.root.clone()));
    }

    if run_args.dry_run {
        print_dry_run(&settings, &roots);
        return Ok(());
    }

    let filter = ChangeFilter::new(Arc::new(RealFileSystem), settings.filter_rules())?;
    let supervisor = ProcessSupervisor::new(
        settings.root.clone(),
        settings.run_args.clone(),
        Arc::clone(&reporter),
    );
    let pipeline = Arc::new(BuildPipeline::new(
        toolchain,
        settings.plan.clone(),
        supervisor,
        Arc::clone(&reporter),
    ));
    let context = SupervisorContext::start(pipeline, settings.quiet_period);

    let watcher = match spawn_watcher(&roots, filter, context.debouncer(), Arc::clone(&reporter)) {
        Ok(watcher) => watcher,
        Err(err) => {
            context.shutdown().await;
            return Err(err);
        }
    };

    context.request_build(TriggerReason::Startup);

    let signal = tokio::signal::ctrl_c().await;
    reporter.report(Tag::Info, "Shutting down...");
    watcher.stop().await;
    context.shutdown().await;
    info!("devloop stopped");

    signal.map_err(DevloopError::from)
}

/// An artifact named like a source file (e.g. `main.go`) would overwrite
/// that file on build.
fn warn_on_app_name_conflict(fs: &dyn FileSystem, settings: &Settings, reporter: &dyn Reporter) {
    let app = &settings.plan.app_name;
    let looks_like_source = settings.extensions.iter().any(|ext| app.ends_with(ext.as_str()));
    if looks_like_source && fs.is_file(&settings.root.join(app)) {
        reporter.report(
            Tag::Warn,
            &format!("The appname '{app}' conflicts with a file of the same name in {}", settings.root.display()),
        );
    }
}

/// Print the effective settings and watch roots.
fn print_dry_run(settings: &Settings, roots: &[WatchRoot]) {
    println!("devloop dry-run");
    println!("  root = {}", settings.root.display());
    println!("  app_name = {}", settings.plan.app_name);
    if let Some(ref tags) = settings.plan.tags {
        println!("  tags = {tags}");
    }
    if let Some(ref entry) = settings.plan.entry_point {
        println!("  main = {}", entry.display());
    }
    println!("  vendor = {}", settings.plan.vendor);
    println!("  warm_install = {}", settings.plan.warm_install);
    println!("  quiet_period = {:?}", settings.quiet_period);
    println!("  change_detection = {:?}", settings.change_detection);
    if !settings.exclusions.is_empty() {
        println!("  exclude = {:?}", settings.exclusions);
    }
    if !settings.run_args.is_empty() {
        println!("  run_args = {:?}", settings.run_args);
    }
    println!();

    println!("watch roots ({}):", roots.len());
    for root in roots {
        println!("  - {}", display_relative(&settings.root, &root.dir));
    }

    debug!("dry-run complete (no execution)");
}

fn display_relative(base: &Path, path: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
