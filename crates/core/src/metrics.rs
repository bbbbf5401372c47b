//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Request resolution (verdicts, outcomes, malformed candidates)
//! - Drafting and ticket escalation
//! - External services (catalog, LLM, tracker)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Resolution Metrics
// =============================================================================

/// Handled requests by final outcome.
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("concierge_requests_total", "Total handled data requests"),
        &["outcome"], // "matched", "match_declined", "escalation_declined", "ticket_created", "ticket_failed", "failed"
    )
    .unwrap()
});

/// Resolution verdicts.
pub static RESOLUTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("concierge_resolutions_total", "Total catalog resolutions"),
        &["verdict"], // "matched", "unmatched", "rejected_claim"
    )
    .unwrap()
});

/// Resolution duration in seconds.
pub static RESOLUTION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "concierge_resolution_duration_seconds",
            "Duration of a catalog resolution",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .unwrap()
});

/// Candidates kept per resolution.
pub static CANDIDATES_FOUND: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "concierge_candidates_found",
            "Number of valid candidates per resolution",
        )
        .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0]),
    )
    .unwrap()
});

/// Catalog records skipped because required fields were missing.
pub static MALFORMED_CANDIDATES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "concierge_malformed_candidates_total",
        "Catalog records skipped as malformed",
    )
    .unwrap()
});

/// Matcher failures absorbed as "no match".
pub static MATCHER_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "concierge_matcher_failures_total",
        "Matcher errors treated as no match",
    )
    .unwrap()
});

// =============================================================================
// Drafting and Escalation Metrics
// =============================================================================

/// Draft attempts by result.
pub static DRAFTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("concierge_drafts_total", "Total SQL draft attempts"),
        &["result"], // "success", "unavailable", "disabled"
    )
    .unwrap()
});

/// Tickets created total.
pub static TICKETS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("concierge_tickets_created_total", "Total tickets created").unwrap()
});

/// Ticket creation failures total.
pub static TICKETS_FAILED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "concierge_tickets_failed_total",
        "Total ticket creations that failed",
    )
    .unwrap()
});

// =============================================================================
// External Service Metrics
// =============================================================================

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "concierge_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests total.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "concierge_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

/// Raw hits returned by catalog searches.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "concierge_search_results",
            "Number of raw catalog hits per search",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0]),
    )
    .unwrap()
});

/// LLM tokens used.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("concierge_llm_tokens_total", "Total LLM tokens used"),
        &["provider", "direction"], // direction: "input", "output"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Resolution
        Box::new(REQUESTS_TOTAL.clone()),
        Box::new(RESOLUTIONS_TOTAL.clone()),
        Box::new(RESOLUTION_DURATION.clone()),
        Box::new(CANDIDATES_FOUND.clone()),
        Box::new(MALFORMED_CANDIDATES.clone()),
        Box::new(MATCHER_FAILURES.clone()),
        // Drafting and escalation
        Box::new(DRAFTS_TOTAL.clone()),
        Box::new(TICKETS_CREATED.clone()),
        Box::new(TICKETS_FAILED.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
