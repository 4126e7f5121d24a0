//! Telemetry metric name constants.
//!
//! Centralised metric names for vidthumb operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `vidthumb_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `status`: request outcome: "ok" or "error"
//! - `format`: output encoding: "jpeg" or "png"

/// Total thumbnail requests handled by the service.
///
/// Labels: `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "vidthumb_requests_total";

/// Requests answered from an existing cache entry.
///
/// Labels: `format`.
pub const CACHE_HITS_TOTAL: &str = "vidthumb_cache_hits_total";

/// Requests that needed a full decode + encode.
///
/// Labels: `format`.
pub const CACHE_MISSES_TOTAL: &str = "vidthumb_cache_misses_total";

/// Cache entries removed by the eviction sweep.
pub const EVICTIONS_TOTAL: &str = "vidthumb_evictions_total";

/// Bytes reclaimed by the eviction sweep.
pub const EVICTED_BYTES_TOTAL: &str = "vidthumb_evicted_bytes_total";

/// Wall time of a cold-path extraction (decode + encode + store), in seconds.
///
/// Labels: `format`.
pub const EXTRACTION_DURATION_SECONDS: &str = "vidthumb_extraction_duration_seconds";

/// Requests that joined an extraction already in flight for the same key.
pub const COALESCED_REQUESTS_TOTAL: &str = "vidthumb_coalesced_requests_total";
