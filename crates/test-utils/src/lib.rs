pub mod builders;

use std::sync::Once;
use std::time::{Duration, SystemTime};

use tracing_subscriber::{fmt, EnvFilter};

pub use builders::{ConfigFileBuilder, SnapshotBuilder, TestWorkspace};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - Only failing tests print captured output (unless run with
///   `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=distwatch=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// A fixed, readable reference instant for gate tests.
pub fn reference_time() -> SystemTime {
    SystemTime::UNIX_EPOCH + Duration::from_secs(1_800_000_000)
}
