//! Tracing setup for harness runs.

use common::config::ObservabilityConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber for test output.
///
/// The filter comes from `config.log_level` (any `EnvFilter` directive),
/// falling back to `info` when it does not parse. Output goes through the
/// test writer so it is captured per test. Only the first call installs a
/// subscriber; later calls are no-ops.
pub fn init_test_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let json_layer = config
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json().with_test_writer());
    let plain_layer = (!config.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_test_writer());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .try_init();
}
