// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::types::ChangeDetection;

/// Top-level configuration as read from `Devloop.toml`.
///
/// ```toml
/// [watch]
/// extensions = [".go", ".tmpl"]
/// exclude = ["vendor", "node_modules"]
/// temp_patterns = ["*.tmp", "*.swp"]
/// change_detection = "mtime"
///
/// [build]
/// tags = "dev sqlite"
/// vendor = false
///
/// [debounce]
/// quiet_period = "1s"
///
/// [run]
/// args = ["-port", "8080"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub build: BuildSection,

    #[serde(default)]
    pub debounce: DebounceSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// File extensions whose changes trigger a rebuild.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Paths (relative to the project root, or absolute) never watched.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File-name patterns of editor temp files, matched case-insensitively.
    #[serde(default = "default_temp_patterns")]
    pub temp_patterns: Vec<String>,

    #[serde(default)]
    pub change_detection: ChangeDetection,
}

fn default_extensions() -> Vec<String> {
    vec![".go".to_string()]
}

fn default_temp_patterns() -> Vec<String> {
    vec!["*.tmp".to_string()]
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude: Vec::new(),
            temp_patterns: default_temp_patterns(),
            change_detection: ChangeDetection::default(),
        }
    }
}

/// `[build]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildSection {
    /// Toolchain executable.
    #[serde(default = "default_program")]
    pub program: String,

    /// Artifact name; defaults to the project directory name.
    #[serde(default)]
    pub app_name: Option<String>,

    /// Comma- or space-separated build tags.
    #[serde(default)]
    pub tags: Option<String>,

    /// Explicit entry point, e.g. `cmd/server/main.go`.
    #[serde(default)]
    pub entry_point: Option<PathBuf>,

    /// Run `vendor_command` before every build when a `vendor` dir exists.
    #[serde(default)]
    pub vendor: bool,

    #[serde(default = "default_vendor_command")]
    pub vendor_command: Vec<String>,

    /// Pre-install the project's packages to warm the build cache.
    #[serde(default = "default_true")]
    pub warm_install: bool,
}

fn default_program() -> String {
    "go".to_string()
}

fn default_vendor_command() -> Vec<String> {
    vec!["godep".to_string(), "save".to_string()]
}

fn default_true() -> bool {
    true
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            app_name: None,
            tags: None,
            entry_point: None,
            vendor: false,
            vendor_command: default_vendor_command(),
            warm_install: true,
        }
    }
}

/// `[debounce]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct DebounceSection {
    /// Duration string (`"500ms"`, `"1s"`, ...).
    #[serde(default = "default_quiet_period")]
    pub quiet_period: String,
}

fn default_quiet_period() -> String {
    "1s".to_string()
}

impl Default for DebounceSection {
    fn default() -> Self {
        Self {
            quiet_period: default_quiet_period(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSection {
    /// Arguments passed to the application on every start.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`),
/// so the quiet period is already parsed and the lists are sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    watch: WatchSection,
    build: BuildSection,
    quiet_period: Duration,
    run: RunSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        watch: WatchSection,
        build: BuildSection,
        quiet_period: Duration,
        run: RunSection,
    ) -> Self {
        Self {
            watch,
            build,
            quiet_period,
            run,
        }
    }

    pub fn watch(&self) -> &WatchSection {
        &self.watch
    }

    pub fn build(&self) -> &BuildSection {
        &self.build
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    pub fn run(&self) -> &RunSection {
        &self.run
    }
}
