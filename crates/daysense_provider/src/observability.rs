//! Lightweight query accounting on top of the `metrics` facade.
//!
//! The engine absorbs per-query failures into "no value", so counters are
//! the only place those failures stay visible.

pub const QUERIES_TOTAL: &str = "daysense_provider_queries_total";
pub const QUERY_FAILURES_TOTAL: &str = "daysense_provider_query_failures_total";

pub fn record_query(endpoint: &'static str) {
    metrics::counter!(QUERIES_TOTAL, "endpoint" => endpoint).increment(1);
}

pub fn record_failure(endpoint: &'static str) {
    metrics::counter!(QUERY_FAILURES_TOTAL, "endpoint" => endpoint).increment(1);
}
