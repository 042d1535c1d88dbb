// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Recording the last-seen stamp of every changed path (`ledger`).
//! - Deciding which raw notifications are relevant (`filter`).
//! - Wiring up the cross-platform filesystem watcher (`notify`) and feeding
//!   accepted changes to the debounce scheduler (`watcher`).
//!
//! It does **not** know how to build anything; it only turns filesystem
//! changes into debounce notifications.

pub mod filter;
pub mod hash;
pub mod ledger;
pub mod watcher;

pub use filter::{ChangeFilter, FilterRules, Verdict};
pub use hash::compute_file_hash;
pub use ledger::{ModificationLedger, Stamp};
pub use watcher::{handle_event, spawn_watcher, WatcherHandle};
