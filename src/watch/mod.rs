// src/watch/mod.rs

//! Polling change detection.
//!
//! This module is responsible for:
//! - Recursively enumerating a set of watch roots on demand.
//! - Reporting files that appeared since the previous enumeration.
//! - Reporting tracked files whose modification time moved.
//! - Mapping both streams to artifacts with per-call de-duplication.
//!
//! It does **not** know about runners or the polling interval; the engine
//! decides when to poll and what to do with the results.

pub mod watcher;

pub use watcher::DirectoryWatcher;
