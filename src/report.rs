// src/report.rs

//! Tagged, single-line lifecycle reporting.
//!
//! Every lifecycle transition (skip, trigger, build start, build result,
//! restart) is reported as one line with a short tag. The core only needs
//! something that accepts such a line; production renders it through
//! `tracing`, tests record it.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Info,
    Warn,
    Error,
    /// A notification was dropped as a duplicate.
    Skip,
    /// A notification was accepted and will trigger a rebuild.
    Event,
    Success,
    Trace,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Info => "INFO",
            Tag::Warn => "WARN",
            Tag::Error => "ERRO",
            Tag::Skip => "SKIP",
            Tag::Event => "EVEN",
            Tag::Success => "SUCC",
            Tag::Trace => "TRAC",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for lifecycle lines.
pub trait Reporter: Send + Sync {
    fn report(&self, tag: Tag, line: &str);
}

pub type SharedReporter = Arc<dyn Reporter>;

/// Production reporter: renders `[TAG] line` through `tracing`, choosing
/// the level from the tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, tag: Tag, line: &str) {
        match tag {
            Tag::Error => error!("[{tag}] {line}"),
            Tag::Warn => warn!("[{tag}] {line}"),
            Tag::Trace => debug!("[{tag}] {line}"),
            Tag::Info | Tag::Skip | Tag::Event | Tag::Success => info!("[{tag}] {line}"),
        }
    }
}
