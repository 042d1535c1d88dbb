// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Rebuild and restart an application whenever its sources change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Devloop.toml` in the current directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Watch the project, rebuild on change and restart the application.
    Run(RunArgs),
    /// Print version information.
    Version,
}

/// Arguments of `devloop run`.
///
/// Everything here is merged on top of the config file.
#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Extra extension to watch (repeatable), e.g. `-t .tmpl`.
    #[arg(short = 't', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Path excluded from watching (repeatable), e.g. `-e vendor`.
    #[arg(short = 'e', long = "exclude", value_name = "PATH")]
    pub exclude: Vec<String>,

    /// Build tags passed through to the toolchain.
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Entry point to build instead of the current package.
    #[arg(long = "main", value_name = "PATH")]
    pub entry_point: Option<PathBuf>,

    /// Artifact name (defaults to the directory name).
    #[arg(long = "app", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Update vendored dependencies before each build.
    #[arg(long)]
    pub vendor: bool,

    /// Resolve settings and watch roots, print them, and exit.
    #[arg(long)]
    pub dry_run: bool,

    /// Arguments passed to the application every time it starts.
    #[arg(last = true, value_name = "ARGS")]
    pub run_args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
