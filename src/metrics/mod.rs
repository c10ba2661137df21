// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::metrics_handler;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Customer operations by outcome (ok, invalid_id, validation, conflict,
//   not_found, internal)
// - Operation latency
// - Email conflicts
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the service
pub struct Metrics {
    registry: Registry,

    pub operations_total: IntCounterVec,
    pub operation_duration: HistogramVec,
    pub conflicts_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new("customer_operations_total", "Total customer operations by outcome"),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new(
                "customer_operation_duration_seconds",
                "Customer operation duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        let conflicts_total = IntCounter::new(
            "customer_conflicts_total",
            "Total create/update requests rejected for a duplicate email",
        )?;
        registry.register(Box::new(conflicts_total.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            operation_duration,
            conflicts_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record the outcome and latency of one customer operation
    pub fn record_operation(&self, operation: &str, outcome: &str, duration_secs: f64) {
        if outcome == "conflict" {
            self.conflicts_total.inc();
        }

        self.operations_total.with_label_values(&[operation, outcome]).inc();
        self.operation_duration
            .with_label_values(&[operation])
            .observe(duration_secs);
    }
}
