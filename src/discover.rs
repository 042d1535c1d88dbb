// src/discover.rs

//! Watch-root discovery.
//!
//! Walks the project tree depth-first in name order. A directory becomes a
//! watch root as soon as one of its direct files has an allowed extension;
//! subdirectories met before that file are visited first, so the order of
//! roots follows the walk.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::types::WatchRoot;
use crate::watch::filter::{has_allowed_extension, is_excluded};

/// Entry names ending in this suffix are never walked or watched.
const DOCS_SUFFIX: &str = "docs";

pub fn discover_watch_roots(
    fs: &dyn FileSystem,
    root: &Path,
    extensions: &[String],
    exclusions: &[PathBuf],
) -> Vec<WatchRoot> {
    let mut roots = Vec::new();
    walk(fs, root, extensions, exclusions, &mut roots);
    debug!(count = roots.len(), "watch root discovery finished");
    roots
}

fn walk(
    fs: &dyn FileSystem,
    dir: &Path,
    extensions: &[String],
    exclusions: &[PathBuf],
    roots: &mut Vec<WatchRoot>,
) {
    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "skipping unreadable directory");
            return;
        }
    };
    entries.sort();

    let mut is_root = false;
    for entry in entries {
        let Some(name) = entry.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if name.ends_with(DOCS_SUFFIX) {
            continue;
        }
        if is_excluded(&entry, exclusions) {
            info!("Excluding from watching [ {} ]", entry.display());
            continue;
        }

        if fs.is_dir(&entry) {
            // Linked directories are never walked, so a link back up the tree cannot loop.
            if fs.is_symlink(&entry) {
                debug!(path = %entry.display(), "not following symlinked directory");
            } else if !name.starts_with('.') {
                walk(fs, &entry, extensions, exclusions, roots);
            }
            continue;
        }

        if !is_root && fs.is_file(&entry) && has_allowed_extension(&entry, extensions) {
            roots.push(WatchRoot::new(dir, extensions));
            is_root = true;
        }
    }
}
