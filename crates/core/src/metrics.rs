//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Issue lookups (per-result counts, latency)
//! - Rendering (blocks, entries per category)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Issue Lookup Metrics
// =============================================================================

/// Issue lookups total by result.
pub static ISSUE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "changelog_jira_issue_lookups_total",
            "Total issue lookups",
        ),
        &["service", "result"], // result: "resolved", "failed"
    )
    .unwrap()
});

/// Issue lookup duration in seconds.
pub static ISSUE_LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "changelog_jira_issue_lookup_duration_seconds",
            "Duration of issue lookups",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service"],
    )
    .unwrap()
});

// =============================================================================
// Rendering Metrics
// =============================================================================

/// Blocks rendered.
pub static BLOCKS_RENDERED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "changelog_jira_blocks_rendered_total",
        "Total pull request blocks rendered",
    )
    .unwrap()
});

/// Entries rendered by category.
pub static ENTRIES_RENDERED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "changelog_jira_entries_total",
            "Total changelog entries rendered",
        ),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(ISSUE_LOOKUPS.clone()),
        Box::new(ISSUE_LOOKUP_DURATION.clone()),
        Box::new(BLOCKS_RENDERED.clone()),
        Box::new(ENTRIES_RENDERED.clone()),
    ]
}
