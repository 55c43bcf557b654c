//! Prometheus metrics for a run.
//!
//! Core counters (issue lookups, rendered entries) are registered here
//! together with run-level metrics. Since the tool exits after one run,
//! metrics are exported by writing the text exposition format to a file
//! for a textfile collector to pick up.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{self, Encoder, Histogram, HistogramOpts, IntGauge, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Run duration in seconds.
pub static RUN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "changelog_jira_run_duration_seconds",
            "Duration of a full changelog run",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
    )
    .unwrap()
});

/// Distinct tickets found in the last run.
pub static TICKETS_FOUND: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "changelog_jira_tickets_found",
        "Distinct ticket ids found in the changelog",
    )
    .unwrap()
});

/// Register all metrics with the registry.
fn register_metrics(registry: &Registry) {
    registry.register(Box::new(RUN_DURATION.clone())).unwrap();
    registry.register(Box::new(TICKETS_FOUND.clone())).unwrap();

    // Core metrics (issue lookups, rendering)
    for metric in changelog_jira_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Write the current metrics to `path`, replacing any previous contents.
pub async fn write_textfile(path: &Path) -> Result<()> {
    tokio::fs::write(path, encode_metrics())
        .await
        .with_context(|| format!("Failed to write metrics to {:?}", path))
}
