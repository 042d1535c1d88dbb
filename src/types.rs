// src/types.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// How the ledger decides whether a changed path really changed.
///
/// - `Mtime`: compare the file's modification time (default).
/// - `Hash`: compare a blake3 hash of the file contents. Slower, but immune
///   to editors that touch files without changing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetection {
    #[default]
    #[serde(alias = "modtime")]
    Mtime,
    Hash,
}

impl FromStr for ChangeDetection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mtime" | "modtime" => Ok(ChangeDetection::Mtime),
            "hash" => Ok(ChangeDetection::Hash),
            other => Err(format!(
                "invalid change_detection: {other} (expected \"mtime\" or \"hash\")"
            )),
        }
    }
}

/// A directory subscribed to change notifications, plus the extensions that
/// are relevant under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRoot {
    pub dir: PathBuf,
    pub extensions: Vec<String>,
}

impl WatchRoot {
    pub fn new(dir: impl Into<PathBuf>, extensions: &[String]) -> Self {
        Self {
            dir: dir.into(),
            extensions: extensions.to_vec(),
        }
    }
}

impl fmt::Display for WatchRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.dir.display(), self.extensions)
    }
}
