//! Tracing setup for tests

use once_cell::sync::Lazy;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_intake::IntakeConfig;

static TRACING: Lazy<()> = Lazy::new(|| {
    let log_level = IntakeConfig::default().log_level;
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Another harness may already own the global subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true).with_test_writer())
        .try_init();
});

/// Installs the test subscriber once per process. `RUST_LOG` overrides the
/// configured level.
pub fn init_test_tracing() {
    Lazy::force(&TRACING);
}
