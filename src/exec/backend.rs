// src/exec/backend.rs

//! Pluggable runner capabilities.
//!
//! The runtime talks to an `ArtifactRunner` once per tick with a non-empty
//! run set, and to a `CoverageRunner` exactly once on shutdown. The two are
//! independent: a runtime is built from one of each.

use std::future::Future;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::Artifact;

/// Boxed future returned by the runner traits.
pub type RunFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Runs the artifacts affected by one tick.
pub trait ArtifactRunner: Send {
    /// `artifacts` is de-duplicated and ordered by kind, then path.
    ///
    /// An error is logged by the caller and does not stop polling.
    fn run_artifacts(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_>;
}

/// Runs once on shutdown with every known artifact that still exists.
pub trait CoverageRunner: Send {
    fn run_coverage(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_>;
}
