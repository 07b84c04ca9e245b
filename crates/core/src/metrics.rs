//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Remote API calls (per endpoint, by result)
//! - Query cache lookups and invalidations
//! - Community search

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Remote API
// =============================================================================

/// Remote API requests by endpoint and result.
pub static API_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("agora_api_requests_total", "Total remote API requests"),
        &["endpoint", "result"], // result: "success", "client_error", "server_error", "network_error"
    )
    .unwrap()
});

/// Remote API request duration in seconds.
pub static API_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "agora_api_request_duration_seconds",
            "Duration of remote API requests",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["endpoint"],
    )
    .unwrap()
});

// =============================================================================
// Query cache
// =============================================================================

/// Cache lookups by outcome.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("agora_cache_lookups_total", "Query cache lookups"),
        &["result"], // "hit", "miss", "shared"
    )
    .unwrap()
});

/// Cache invalidations (single keys and scopes).
pub static CACHE_INVALIDATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "agora_cache_invalidations_total",
        "Query cache keys invalidated",
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Search index rebuilds.
pub static SEARCH_INDEX_BUILDS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "agora_search_index_builds_total",
        "Community search index rebuilds",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(API_REQUESTS.clone()),
        Box::new(API_REQUEST_DURATION.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(CACHE_INVALIDATIONS.clone()),
        Box::new(SEARCH_INDEX_BUILDS.clone()),
    ]
}

/// Metric label for an HTTP status.
pub fn status_label(status: u16) -> &'static str {
    match status {
        200..=399 => "success",
        400..=499 => "client_error",
        _ => "server_error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_count() {
        assert_eq!(all_metrics().len(), 5);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(204), "success");
        assert_eq!(status_label(404), "client_error");
        assert_eq!(status_label(503), "server_error");
    }
}
