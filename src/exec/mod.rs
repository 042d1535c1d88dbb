// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] owns the single running application instance and
//!   implements kill-and-restart.
//! - [`child`] is the owner task that holds a spawned child until it exits
//!   or is told to die.

pub mod child;
pub mod supervisor;

pub use supervisor::{normalize_program, KillError, KillOutcome, ProcessSupervisor};
