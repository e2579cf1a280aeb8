//! Initialization when another subscriber already owns the process.
//!
//! Runs in its own test binary so the foreign subscriber cannot leak into
//! other observability tests.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use localstore::Error;
use localstore::observability::{self, MetricsConfig, ObservabilityConfig};
use metrics_exporter_prometheus::PrometheusBuilder;

fn failed_operation(result: localstore::Result<observability::ObservabilityHandle>) -> String {
    match result {
        Err(Error::OperationFailed { operation, .. }) => operation,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("init succeeded with a subscriber already installed"),
    }
}

#[test]
fn test_failed_subscriber_init_leaves_recorder_slot_free() {
    tracing::subscriber::set_global_default(tracing_subscriber::registry()).unwrap();

    let config = ObservabilityConfig {
        metrics: MetricsConfig { enabled: true },
        ..ObservabilityConfig::default()
    };

    let first = failed_operation(observability::init(config.clone()));
    assert_eq!(first, "observability_init");
    let second = failed_operation(observability::init(config));
    assert_eq!(second, "observability_init");

    assert!(PrometheusBuilder::new().install_recorder().is_ok());
}
