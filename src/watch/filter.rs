// src/watch/filter.rs

//! Per-notification relevance decision.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use notify::EventKind;

use crate::fs::FileSystem;
use crate::types::ChangeDetection;
use crate::watch::ledger::{ModificationLedger, Stamp};

/// Why a notification was (or was not) considered relevant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Relevant: a rebuild should be scheduled.
    Accept,
    /// Access-only event; nothing was written.
    AccessOnly,
    /// Editor temp/swap file.
    TempFile,
    /// Extension not in the allow-list.
    Extension,
    /// Under an exclusion rule.
    Excluded,
    /// Same stamp as last time: a repeated notification for one write.
    Duplicate,
}

impl Verdict {
    pub fn is_relevant(self) -> bool {
        self == Verdict::Accept
    }
}

/// Inputs for building a [`ChangeFilter`].
#[derive(Debug, Clone)]
pub struct FilterRules {
    /// Allowed extensions, with leading dot.
    pub extensions: Vec<String>,
    /// Temp-file name patterns, matched case-insensitively.
    pub temp_patterns: Vec<String>,
    /// Absolute path prefixes that are never relevant.
    pub exclusions: Vec<PathBuf>,
    pub detection: ChangeDetection,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            extensions: vec![".go".to_string()],
            temp_patterns: vec!["*.tmp".to_string()],
            exclusions: Vec::new(),
            detection: ChangeDetection::Mtime,
        }
    }
}

/// Decides which raw notifications are worth a rebuild.
///
/// The filter owns the modification ledger; it is driven from the single
/// watcher listener task, so no locking is needed.
#[derive(Debug)]
pub struct ChangeFilter {
    fs: Arc<dyn FileSystem>,
    extensions: Vec<String>,
    temp_files: GlobSet,
    exclusions: Vec<PathBuf>,
    detection: ChangeDetection,
    ledger: ModificationLedger,
}

impl ChangeFilter {
    pub fn new(fs: Arc<dyn FileSystem>, rules: FilterRules) -> Result<Self> {
        let temp_files = build_temp_globset(&rules.temp_patterns)?;
        Ok(Self {
            fs,
            extensions: rules.extensions,
            temp_files,
            exclusions: rules.exclusions,
            detection: rules.detection,
            ledger: ModificationLedger::new(),
        })
    }

    /// Classify one `(path, kind)` notification.
    ///
    /// The ledger is updated for every path that passes the name, extension
    /// and exclusion checks, whether it turns out to be a duplicate or not.
    pub fn check(&mut self, path: &Path, kind: &EventKind) -> Verdict {
        if matches!(kind, EventKind::Access(_)) {
            return Verdict::AccessOnly;
        }
        if self.is_temp_file(path) {
            return Verdict::TempFile;
        }
        if !has_allowed_extension(path, &self.extensions) {
            return Verdict::Extension;
        }
        if is_excluded(path, &self.exclusions) {
            return Verdict::Excluded;
        }

        let stamp = Stamp::current(self.fs.as_ref(), path, self.detection);
        if self.ledger.record(path, stamp) {
            Verdict::Accept
        } else {
            Verdict::Duplicate
        }
    }

    pub fn is_temp_file(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.temp_files.is_match(Path::new(name)))
            .unwrap_or(false)
    }

    pub fn ledger(&self) -> &ModificationLedger {
        &self.ledger
    }
}

/// True when the file name ends with one of `extensions`.
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    extensions.iter().any(|ext| name.ends_with(ext.as_str()))
}

/// True when `path` lies under any exclusion prefix (component-wise).
pub fn is_excluded(path: &Path, exclusions: &[PathBuf]) -> bool {
    exclusions.iter().any(|prefix| path.starts_with(prefix))
}

fn build_temp_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid temp-file pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
