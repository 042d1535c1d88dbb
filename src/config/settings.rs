// src/config/settings.rs

//! Effective settings for one `devloop run`: the validated config file with
//! the CLI flags merged on top and every path resolved against the project
//! root.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::cli::RunArgs;
use crate::config::model::ConfigFile;
use crate::engine::pipeline::BuildPlan;
use crate::errors::{DevloopError, Result};
use crate::types::ChangeDetection;
use crate::watch::filter::FilterRules;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Project root; builds and the application run here.
    pub root: PathBuf,
    pub extensions: Vec<String>,
    /// Absolute exclusion prefixes.
    pub exclusions: Vec<PathBuf>,
    pub temp_patterns: Vec<String>,
    pub change_detection: ChangeDetection,
    pub quiet_period: Duration,
    pub program: String,
    pub vendor_command: Vec<String>,
    pub plan: BuildPlan,
    pub run_args: Vec<String>,
}

impl Settings {
    /// Merge `args` on top of `cfg`.
    ///
    /// - Extensions and exclusions from the CLI are appended to the config
    ///   lists (duplicates dropped).
    /// - Scalar flags (`--tags`, `--main`, `--app`) replace config values.
    /// - `--vendor` can only switch vendoring on.
    /// - Run arguments from the CLI replace `[run].args` when non-empty.
    pub fn resolve(cfg: &ConfigFile, args: &RunArgs, root: PathBuf) -> Result<Self> {
        let mut extensions: Vec<String> = Vec::new();
        for ext in cfg.watch().extensions.iter().chain(args.extensions.iter()) {
            let ext = normalize_extension(ext).ok_or_else(|| {
                DevloopError::ConfigError(format!("invalid extension {ext:?}"))
            })?;
            if !extensions.contains(&ext) {
                extensions.push(ext);
            }
        }

        let mut exclusions: Vec<PathBuf> = Vec::new();
        for raw in cfg.watch().exclude.iter().chain(args.exclude.iter()) {
            let path = resolve_exclusion(&root, raw);
            if !exclusions.contains(&path) {
                exclusions.push(path);
            }
        }

        let build = cfg.build();
        let app_name = args
            .app_name
            .clone()
            .or_else(|| build.app_name.clone())
            .unwrap_or_else(|| dir_base_name(&root));

        let tags = args
            .tags
            .clone()
            .or_else(|| build.tags.clone())
            .filter(|t| !t.trim().is_empty());

        let plan = BuildPlan {
            app_name: with_exe_suffix(&app_name),
            tags,
            entry_point: args.entry_point.clone().or_else(|| build.entry_point.clone()),
            vendor: args.vendor || build.vendor,
            warm_install: build.warm_install,
        };

        // Config-only vendoring is rejected during validation; this catches `--vendor`.
        if plan.vendor && build.vendor_command.is_empty() {
            return Err(DevloopError::ConfigError(
                "vendoring requested but [build].vendor_command is empty".to_string(),
            ));
        }

        let run_args = if args.run_args.is_empty() {
            cfg.run().args.clone()
        } else {
            args.run_args.clone()
        };

        Ok(Self {
            root,
            extensions,
            exclusions,
            temp_patterns: cfg.watch().temp_patterns.clone(),
            change_detection: cfg.watch().change_detection,
            quiet_period: cfg.quiet_period(),
            program: build.program.clone(),
            vendor_command: build.vendor_command.clone(),
            plan,
            run_args,
        })
    }

    /// Rules for the change filter.
    pub fn filter_rules(&self) -> FilterRules {
        FilterRules {
            extensions: self.extensions.clone(),
            temp_patterns: self.temp_patterns.clone(),
            exclusions: self.exclusions.clone(),
            detection: self.change_detection,
        }
    }
}

/// `"go"` and `".go"` both become `".go"`. Returns `None` for blanks.
pub fn normalize_extension(ext: &str) -> Option<String> {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!(".{trimmed}"))
    }
}

/// Append the platform's executable suffix unless already present.
pub fn with_exe_suffix(name: &str) -> String {
    let suffix = std::env::consts::EXE_SUFFIX;
    if suffix.is_empty() || name.ends_with(suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}

fn dir_base_name(root: &Path) -> String {
    root.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string())
}

/// Make an exclusion absolute and lexically clean (`./vendor` → `<root>/vendor`).
pub fn resolve_exclusion(root: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw.trim());
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut clean = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                clean.pop();
            }
            other => clean.push(other.as_os_str()),
        }
    }
    clean
}
