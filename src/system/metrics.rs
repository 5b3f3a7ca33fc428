//! Metrics collection for polygon-graph
//!
//! Prometheus counters for the grouping and pair sweep stages, kept in a
//! crate-local registry so embedding applications can expose or ignore them.

use crate::core::Result;
use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, Registry};
use std::time::Instant;

/// Global metrics registry
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// Transform metrics
pub struct Metrics {
    /// Features read from input layers
    pub features_read: IntCounter,
    /// Features excluded by the null policy
    pub features_skipped: IntCounter,
    /// Groups produced by the grouper
    pub groups_built: IntCounter,
    /// Group pairs considered by the sweep
    pub pairs_considered: IntCounter,
    /// Group pairs rejected by the bounding-box filter
    pub bbox_rejections: IntCounter,
    /// Exact predicate evaluations
    pub predicate_evaluations: IntCounter,
    /// Edges emitted
    pub edges_emitted: IntCounter,
    /// Pair sweep duration in seconds
    pub build_duration: Histogram,
    /// End-to-end run duration in seconds
    pub run_duration: Histogram,
}

impl Metrics {
    /// Create and register a new metrics instance
    fn new(registry: &Registry) -> Result<Self> {
        Ok(Self {
            features_read: counter(registry, "pg_features_read_total", "Total number of features read")?,
            features_skipped: counter(
                registry,
                "pg_features_skipped_total",
                "Total number of features skipped for a null grouping value",
            )?,
            groups_built: counter(registry, "pg_groups_built_total", "Total number of groups built")?,
            pairs_considered: counter(
                registry,
                "pg_pairs_considered_total",
                "Total number of group pairs considered",
            )?,
            bbox_rejections: counter(
                registry,
                "pg_bbox_rejections_total",
                "Total number of group pairs rejected by bounding box",
            )?,
            predicate_evaluations: counter(
                registry,
                "pg_predicate_evaluations_total",
                "Total number of exact intersection tests",
            )?,
            edges_emitted: counter(registry, "pg_edges_emitted_total", "Total number of edges emitted")?,
            build_duration: histogram(
                registry,
                "pg_build_duration_seconds",
                "Duration of the pair sweep in seconds",
            )?,
            run_duration: histogram(
                registry,
                "pg_run_duration_seconds",
                "Duration of a full read, build and write run in seconds",
            )?,
        })
    }

    /// Get the global metrics instance
    pub fn global() -> &'static Metrics {
        static INSTANCE: Lazy<Metrics> = Lazy::new(|| {
            Metrics::new(&REGISTRY).expect("Failed to initialize metrics")
        });
        &INSTANCE
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> Result<IntCounter> {
    let counter = IntCounter::new(name, help)?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

fn histogram(registry: &Registry, name: &str, help: &str) -> Result<Histogram> {
    let opts = HistogramOpts::new(name, help)
        .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]);
    let histogram = Histogram::with_opts(opts)?;
    registry.register(Box::new(histogram.clone()))?;
    Ok(histogram)
}

/// Timer for measuring operation duration with automatic histogram recording
pub struct Timer {
    /// Start time of the operation
    start: Instant,
    /// Histogram to record the duration when finished
    histogram: Histogram,
}

impl Timer {
    /// Start a new timer
    pub fn start(histogram: Histogram) -> Self {
        Self {
            start: Instant::now(),
            histogram,
        }
    }

    /// Record the elapsed time and consume the timer
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        self.histogram.observe(duration.as_secs_f64());
        duration
    }
}

/// Register the global metrics
pub fn init_registry() {
    let _ = Metrics::global();
}

/// Get the Prometheus registry
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Collect all metrics in the Prometheus text exposition format
pub fn gather_text() -> String {
    let encoder = prometheus::TextEncoder::new();
    let metric_families = registry().gather();
    encoder.encode_to_string(&metric_families).unwrap_or_default()
}
