// src/engine/mod.rs

//! Orchestration engine for testwatch.
//!
//! This module ties together:
//! - one `DirectoryWatcher` + `PathMapper` pair per artifact kind
//! - the per-tick run set and the never-shrinking known-artifact sets
//! - the polling loop that hands run sets to an `ArtifactRunner` and, on
//!   shutdown, the known artifacts to a `CoverageRunner`
//!
//! The synchronous dispatcher lives in [`core`]; the async shell that owns
//! the interval and the cancellation token is implemented in [`runtime`].

use std::time::Duration;

pub mod core;
pub mod runtime;

pub use self::core::{ArtifactWatch, ChangeDispatcher};
pub use self::runtime::Runtime;

/// Runtime options for the polling loop.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Pause between the end of one tick and the start of the next.
    pub interval: Duration,
    /// Stop after the first tick (used for `--once`).
    pub once: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            once: false,
        }
    }
}
