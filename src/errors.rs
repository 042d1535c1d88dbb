// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DevloopError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("No directories with watched extensions found under {0:?}")]
    NoWatchRoots(PathBuf),

    #[error("Failed to create file watcher: {0}")]
    WatcherInit(#[source] notify::Error),

    #[error("Failed to watch directory {path:?}: {source}")]
    WatchRoot {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DevloopError {
    /// Errors that make supervision meaningless: nothing to watch, or the
    /// notification mechanism could not be set up.
    pub fn is_startup_fatal(&self) -> bool {
        matches!(
            self,
            DevloopError::NoWatchRoots(_)
                | DevloopError::WatcherInit(_)
                | DevloopError::WatchRoot { .. }
        )
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        if self.is_startup_fatal() { 2 } else { 1 }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, DevloopError>;
