#![allow(dead_code)]

use std::path::PathBuf;

use devloop::cli::RunArgs;
use devloop::config::{ConfigFile, RawConfigFile};
use devloop::engine::BuildPlan;
use devloop::types::ChangeDetection;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    /// Replace the default extension list.
    pub fn extensions(mut self, exts: &[&str]) -> Self {
        self.config.watch.extensions = exts.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn exclude(mut self, path: &str) -> Self {
        self.config.watch.exclude.push(path.to_string());
        self
    }

    pub fn temp_pattern(mut self, pattern: &str) -> Self {
        self.config.watch.temp_patterns.push(pattern.to_string());
        self
    }

    pub fn change_detection(mut self, detection: ChangeDetection) -> Self {
        self.config.watch.change_detection = detection;
        self
    }

    pub fn quiet_period(mut self, period: &str) -> Self {
        self.config.debounce.quiet_period = period.to_string();
        self
    }

    pub fn app_name(mut self, name: &str) -> Self {
        self.config.build.app_name = Some(name.to_string());
        self
    }

    pub fn tags(mut self, tags: &str) -> Self {
        self.config.build.tags = Some(tags.to_string());
        self
    }

    pub fn vendor(mut self, val: bool) -> Self {
        self.config.build.vendor = val;
        self
    }

    pub fn vendor_command(mut self, cmd: &[&str]) -> Self {
        self.config.build.vendor_command = cmd.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn warm_install(mut self, val: bool) -> Self {
        self.config.build.warm_install = val;
        self
    }

    pub fn run_args(mut self, args: &[&str]) -> Self {
        self.config.run.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `RunArgs` (the `devloop run` flags).
#[derive(Default)]
pub struct RunArgsBuilder {
    args: RunArgs,
}

impl RunArgsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ext(mut self, ext: &str) -> Self {
        self.args.extensions.push(ext.to_string());
        self
    }

    pub fn exclude(mut self, path: &str) -> Self {
        self.args.exclude.push(path.to_string());
        self
    }

    pub fn tags(mut self, tags: &str) -> Self {
        self.args.tags = Some(tags.to_string());
        self
    }

    pub fn entry_point(mut self, path: &str) -> Self {
        self.args.entry_point = Some(PathBuf::from(path));
        self
    }

    pub fn app_name(mut self, name: &str) -> Self {
        self.args.app_name = Some(name.to_string());
        self
    }

    pub fn vendor(mut self, val: bool) -> Self {
        self.args.vendor = val;
        self
    }

    pub fn run_arg(mut self, arg: &str) -> Self {
        self.args.run_args.push(arg.to_string());
        self
    }

    pub fn build(self) -> RunArgs {
        self.args
    }
}

/// A plan that builds `app` with no tags, no vendoring and no warm install.
pub fn plan(app: &str) -> BuildPlan {
    BuildPlan {
        app_name: app.to_string(),
        tags: None,
        entry_point: None,
        vendor: false,
        warm_install: false,
    }
}
