// src/engine/runtime.rs

use std::fmt;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::errors::Result;
use crate::exec::{ArtifactRunner, CoverageRunner};

use super::RuntimeOptions;
use super::core::ChangeDispatcher;

/// Polls the [`ChangeDispatcher`] on a fixed interval and hands run sets to
/// the runner collaborators.
///
/// Ticks never overlap: the next tick starts only after the previous tick's
/// runner invocation has finished and the interval has elapsed. The
/// cancellation token is observed once per tick boundary; after it fires,
/// the coverage runner gets one final pass over the known artifacts. A
/// project with nothing to run stops after its first tick.
pub struct Runtime<R: ArtifactRunner, C: CoverageRunner> {
    core: ChangeDispatcher,
    runner: R,
    coverage: C,
    options: RuntimeOptions,
    cancel: CancellationToken,
}

impl<R: ArtifactRunner, C: CoverageRunner> fmt::Debug for Runtime<R, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R: ArtifactRunner, C: CoverageRunner> Runtime<R, C> {
    pub fn new(
        core: ChangeDispatcher,
        runner: R,
        coverage: C,
        options: RuntimeOptions,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            core,
            runner,
            coverage,
            options,
            cancel,
        }
    }

    /// Main polling loop.
    ///
    /// Returns right after the first tick when no source maps to an existing
    /// artifact. Runner failures are logged and polling continues; only a
    /// coverage failure is returned.
    pub async fn run(mut self) -> Result<()> {
        info!(interval = ?self.options.interval, "testwatch runtime started");

        loop {
            let batch = self.core.tick();

            if !batch.is_empty() {
                let names: Vec<_> = batch.iter().map(|a| a.path.as_str()).collect();
                info!(count = batch.len(), artifacts = ?names, "running affected artifacts");
                if let Err(err) = self.runner.run_artifacts(batch).await {
                    error!(error = %err, "artifact runner failed; continuing");
                }
            }

            if self.core.ticks() == 1 && !self.core.has_known_artifacts() {
                info!("no specs or tests to run; stopping");
                return Ok(());
            }

            if self.options.once {
                debug!("single tick requested; stopping");
                break;
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    info!("stop requested; collecting known artifacts");
                    break;
                }

                _ = tokio::time::sleep(self.options.interval) => {}
            }
        }

        let targets = self.core.coverage_targets();
        self.coverage.run_coverage(targets).await?;

        info!(ticks = self.core.ticks(), "runtime exiting");
        Ok(())
    }
}
