// src/engine/mod.rs

//! Orchestration engine for devloop.
//!
//! This module ties together:
//! - the debounce scheduler that turns bursts of accepted changes into
//!   single rebuild triggers
//! - the build pipeline (the build-serialization critical section)
//! - the build worker that feeds triggers into the pipeline one at a time
//! - the supervisor context that owns all of the above for one run
//!
//! The pure debounce state lives in [`debounce::PendingWindow`]; everything
//! else is the async shell around the toolchain and process supervisor.

/// Why a build was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// The initial build at startup.
    Startup,
    /// A burst of relevant file changes went quiet.
    FileChange,
}

/// A request for one run of the build pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildTrigger {
    pub reason: TriggerReason,
}

pub mod context;
pub mod debounce;
pub mod pipeline;

pub use context::SupervisorContext;
pub use debounce::{spawn_debouncer, DebounceHandle, PendingWindow};
pub use pipeline::{spawn_build_worker, BuildOutcome, BuildPipeline, BuildPlan};
