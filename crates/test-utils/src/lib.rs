//! Shared helpers for testwatch integration tests.

pub mod builders;
pub mod fake_runner;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

static TRACING: Once = Once::new();

/// Upper bound for any single async test body.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Install a test-writer subscriber once per test binary.
///
/// Output is captured by the harness; `RUST_LOG=testwatch=trace` widens it.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("testwatch=debug,warn"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}

/// Await `fut`, failing the test if it outlives [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(fut: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(value) => value,
        Err(_) => panic!("test body did not finish within {TEST_TIMEOUT:?}"),
    }
}
