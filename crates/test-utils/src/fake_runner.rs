use std::sync::{Arc, Mutex};

use tokio_util::sync::CancellationToken;
use testwatch::errors::TestwatchError;
use testwatch::exec::{ArtifactRunner, CoverageRunner, RunFuture};
use testwatch::types::Artifact;

/// A fake artifact runner that:
/// - records every batch it was handed
/// - optionally cancels a token once it has seen `cancel_after` batches
/// - optionally fails every call, to exercise error handling
#[derive(Clone, Default)]
pub struct FakeRunner {
    batches: Arc<Mutex<Vec<Vec<Artifact>>>>,
    cancel: Option<(CancellationToken, usize)>,
    fail: bool,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_after(mut self, batches: usize, token: CancellationToken) -> Self {
        self.cancel = Some((token, batches));
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Snapshot of the recorded batches.
    pub fn batches(&self) -> Vec<Vec<Artifact>> {
        self.batches.lock().unwrap().clone()
    }
}

impl ArtifactRunner for FakeRunner {
    fn run_artifacts(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_> {
        let batches = Arc::clone(&self.batches);
        let cancel = self.cancel.clone();
        let fail = self.fail;

        Box::pin(async move {
            let seen = {
                let mut guard = batches.lock().unwrap();
                guard.push(artifacts);
                guard.len()
            };
            if let Some((token, after)) = cancel {
                if seen >= after {
                    token.cancel();
                }
            }
            if fail {
                return Err(TestwatchError::Other(anyhow::anyhow!("fake runner failure")));
            }
            Ok(())
        })
    }
}

/// A fake coverage runner that records what it was asked to cover.
#[derive(Clone, Default)]
pub struct FakeCoverage {
    calls: Arc<Mutex<Vec<Vec<Artifact>>>>,
}

impl FakeCoverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Vec<Artifact>> {
        self.calls.lock().unwrap().clone()
    }
}

impl CoverageRunner for FakeCoverage {
    fn run_coverage(&mut self, artifacts: Vec<Artifact>) -> RunFuture<'_> {
        let calls = Arc::clone(&self.calls);
        Box::pin(async move {
            calls.lock().unwrap().push(artifacts);
            Ok(())
        })
    }
}
