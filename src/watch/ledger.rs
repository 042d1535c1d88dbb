// src/watch/ledger.rs

//! Modification ledger: the last stamp seen for every changed path.
//!
//! Notification backends routinely emit several events for one logical
//! write. The ledger lets the change filter drop the repeats: an event whose
//! current stamp equals the recorded one carries no new content.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::fs::FileSystem;
use crate::types::ChangeDetection;
use crate::watch::hash::compute_file_hash;

/// Change fingerprint recorded per path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stamp {
    Modified(SystemTime),
    Content(String),
}

impl Stamp {
    /// Read the current stamp of `path`.
    ///
    /// A path that cannot be read (usually deleted between the event and
    /// this lookup) is stamped with the current time, so it always counts as
    /// changed.
    pub fn current(fs: &dyn FileSystem, path: &Path, detection: ChangeDetection) -> Stamp {
        let stamp = match detection {
            ChangeDetection::Mtime => fs.modified(path).map(Stamp::Modified),
            ChangeDetection::Hash => compute_file_hash(fs, path).map(Stamp::Content),
        };

        stamp.unwrap_or_else(|err| {
            debug!(?path, error = %err, "cannot stamp path; treating it as changed");
            Stamp::Modified(SystemTime::now())
        })
    }
}

/// Path → last-seen stamp. Entries are never removed; the watched tree is
/// bounded by the project size.
#[derive(Debug, Default)]
pub struct ModificationLedger {
    entries: HashMap<PathBuf, Stamp>,
}

impl ModificationLedger {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Record `stamp` for `path`. Returns `true` when it differs from the
    /// previously recorded stamp (or none was recorded).
    pub fn record(&mut self, path: &Path, stamp: Stamp) -> bool {
        let changed = self.entries.get(path) != Some(&stamp);
        self.entries.insert(path.to_path_buf(), stamp);
        changed
    }

    pub fn get(&self, path: &Path) -> Option<&Stamp> {
        self.entries.get(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
