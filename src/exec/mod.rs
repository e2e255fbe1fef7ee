// src/exec/mod.rs

//! Runner collaborators.
//!
//! The engine hands artifact batches to these and does not care how they are
//! executed or what they print.
//!
//! - [`backend`] defines the `ArtifactRunner` and `CoverageRunner`
//!   capabilities. The runtime is generic over both, so tests can plug in
//!   recording fakes.
//! - [`command`] holds the production implementations, which render a shell
//!   command template and run it with `tokio::process::Command`.

pub mod backend;
pub mod command;

pub use backend::{ArtifactRunner, CoverageRunner, RunFuture};
pub use command::{CommandRunner, CommandTemplate, CoverageCommand, SkipCoverage};
