//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - HTTP request counts by method, route and status
//! - HTTP request latency histograms
//! - Notifications stored, dispatched and failed
//! - Images stored and removed
//! - Rows deleted by the maintenance task

use once_cell::sync::Lazy;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "shopping_api";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// HTTP request counter - tracks total requests by method, route, and status code
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests").namespace(NAMESPACE),
        &["method", "path", "status"],
    )
    .expect("Failed to create HTTP_REQUESTS_TOTAL metric")
});

/// HTTP request latency histogram - tracks request duration in seconds
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];
    HistogramVec::new(
        HistogramOpts::new("http_request_duration_seconds", "HTTP request latency in seconds")
            .namespace(NAMESPACE)
            .buckets(buckets),
        &["method", "path"],
    )
    .expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric")
});

/// Notifications written by the notifications module
pub static NOTIFICATIONS_STORED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("notifications_stored_total", "Notifications persisted").namespace(NAMESPACE),
    )
    .expect("Failed to create NOTIFICATIONS_STORED_TOTAL metric")
});

/// Notification batches sent to the notifications module, by outcome
pub static NOTIFICATIONS_DISPATCHED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("notifications_dispatched_total", "Notifications sent to the notifications module")
            .namespace(NAMESPACE),
        &["outcome"], // "ok", "failed"
    )
    .expect("Failed to create NOTIFICATIONS_DISPATCHED_TOTAL metric")
});

/// Image files written or deleted, by kind
pub static IMAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("images_total", "Image files stored or removed").namespace(NAMESPACE),
        &["kind", "operation"], // operation: "stored", "removed"
    )
    .expect("Failed to create IMAGES_TOTAL metric")
});

/// Rows removed by the maintenance task
pub static MAINTENANCE_REMOVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("maintenance_removed_total", "Rows deleted by periodic cleanup").namespace(NAMESPACE),
        &["table"],
    )
    .expect("Failed to create MAINTENANCE_REMOVED_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("Failed to register HTTP_REQUESTS_TOTAL");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("Failed to register HTTP_REQUEST_DURATION_SECONDS");
    registry
        .register(Box::new(NOTIFICATIONS_STORED_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_STORED_TOTAL");
    registry
        .register(Box::new(NOTIFICATIONS_DISPATCHED_TOTAL.clone()))
        .expect("Failed to register NOTIFICATIONS_DISPATCHED_TOTAL");
    registry
        .register(Box::new(IMAGES_TOTAL.clone()))
        .expect("Failed to register IMAGES_TOTAL");
    registry
        .register(Box::new(MAINTENANCE_REMOVED_TOTAL.clone()))
        .expect("Failed to register MAINTENANCE_REMOVED_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record HTTP request metrics
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, path, &status.to_string()])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, path])
        .observe(duration_secs);
}

pub fn record_notifications_stored(count: usize) {
    NOTIFICATIONS_STORED_TOTAL.inc_by(count as u64);
}

pub fn record_notifications_dispatched(count: usize, ok: bool) {
    let outcome = if ok { "ok" } else { "failed" };
    NOTIFICATIONS_DISPATCHED_TOTAL
        .with_label_values(&[outcome])
        .inc_by(count as u64);
}

pub fn record_image(kind: &str, operation: &str) {
    IMAGES_TOTAL.with_label_values(&[kind, operation]).inc();
}

pub fn record_maintenance_removed(table: &str, count: u64) {
    MAINTENANCE_REMOVED_TOTAL.with_label_values(&[table]).inc_by(count);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // Force lazy initialization
        let _ = &*REGISTRY;
        let _ = &*HTTP_REQUESTS_TOTAL;
        let _ = &*NOTIFICATIONS_DISPATCHED_TOTAL;
        let _ = &*IMAGES_TOTAL;
    }

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/health", 200, 0.001);
        let metrics = gather_metrics();
        assert!(metrics.contains("shopping_api_http_requests_total"));
    }

    #[test]
    fn test_record_notifications() {
        record_notifications_stored(3);
        record_notifications_dispatched(2, false);
        let metrics = gather_metrics();
        assert!(metrics.contains("shopping_api_notifications_stored_total"));
        assert!(metrics.contains("outcome=\"failed\""));
    }
}
