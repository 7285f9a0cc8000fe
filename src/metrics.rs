//! Prometheus metrics for the gesture server
//!
//! Exposes request rates and latencies, store operation counts, index size
//! and backup export health.
//!
//! NOTE: Labels are never used as metric labels; gesture names are user
//! data and would make cardinality unbounded.

use lazy_static::lazy_static;
use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
};

lazy_static! {
    /// Global metrics registry
    pub static ref METRICS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // Request Metrics
    // ============================================================================

    /// HTTP request duration in seconds
    pub static ref HTTP_REQUEST_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "signbridge_http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["method", "endpoint", "status"]
    ).unwrap();

    /// Total HTTP requests
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signbridge_http_requests_total", "Total HTTP requests"),
        &["method", "endpoint", "status"]
    ).unwrap();

    // ============================================================================
    // Gesture Store Metrics
    // ============================================================================

    /// Gesture inserts by result ("ok", "dimension_mismatch", "invalid")
    pub static ref GESTURE_INSERT_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signbridge_gesture_insert_total", "Total gesture insert operations"),
        &["result"]
    ).unwrap();

    /// Gesture searches by result ("hit", "empty", "dimension_mismatch")
    pub static ref GESTURE_SEARCH_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signbridge_gesture_search_total", "Total gesture search operations"),
        &["result"]
    ).unwrap();

    /// Gesture search duration
    pub static ref GESTURE_SEARCH_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "signbridge_gesture_search_duration_seconds",
            "Gesture search duration"
        )
        .buckets(vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1])
    ).unwrap();

    /// Records removed by delete-by-label
    pub static ref GESTURE_DELETED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signbridge_gesture_deleted_total", "Total gesture records deleted"),
        &["reason"]  // reason: "label", "reset"
    ).unwrap();

    /// Records currently held by the index
    pub static ref INDEX_SIZE: IntGauge = IntGauge::new(
        "signbridge_index_size",
        "Number of gesture records in the similarity index"
    ).unwrap();

    // ============================================================================
    // Backup Metrics
    // ============================================================================

    /// Backup exports by result ("ok", "failed")
    pub static ref BACKUP_EXPORT_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("signbridge_backup_export_total", "Total backup artifact exports"),
        &["result"]
    ).unwrap();

    /// Backup export duration
    pub static ref BACKUP_EXPORT_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "signbridge_backup_export_duration_seconds",
            "Backup artifact export duration"
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    ).unwrap();
}

/// Register all metrics with the global registry
pub fn register_metrics() -> Result<(), prometheus::Error> {
    // Request metrics
    METRICS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;

    // Store metrics
    METRICS_REGISTRY.register(Box::new(GESTURE_INSERT_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(GESTURE_SEARCH_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(GESTURE_SEARCH_DURATION.clone()))?;
    METRICS_REGISTRY.register(Box::new(GESTURE_DELETED_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(INDEX_SIZE.clone()))?;

    // Backup metrics
    METRICS_REGISTRY.register(Box::new(BACKUP_EXPORT_TOTAL.clone()))?;
    METRICS_REGISTRY.register(Box::new(BACKUP_EXPORT_DURATION.clone()))?;

    Ok(())
}

/// Render the registry in the Prometheus text format
pub fn gather_text() -> Result<String, prometheus::Error> {
    use prometheus::Encoder;

    let encoder = prometheus::TextEncoder::new();
    let families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Helper to time operations with histogram (RAII pattern)
/// Usage: let _timer = Timer::new(SOME_HISTOGRAM.clone());
pub struct Timer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl Timer {
    /// Create timer that records duration to histogram on drop
    pub fn new(histogram: Histogram) -> Self {
        Self {
            histogram,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
