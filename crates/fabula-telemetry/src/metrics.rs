//! Metric names and instrument constructors
//!
//! Instruments come from the global meter provider, so they are no-ops
//! until [`crate::init`] installs an exporter.

use std::time::Instant;

pub use opentelemetry::KeyValue;
pub use opentelemetry::metrics::{Counter, Histogram, Meter};

// Story metric names
pub const STORY_STARTED: &str = "story.started";
pub const STORY_DELIVERED: &str = "story.delivered";
pub const STORY_CANCELLED: &str = "story.cancelled";
pub const STORY_EVICTED: &str = "story.evicted";
pub const STORY_GENERATION_FAILED: &str = "story.generation.failed";
pub const STORY_GENERATION_DURATION: &str = "story.generation.duration";

// LLM metric names
pub const LLM_REQUEST_DURATION: &str = "llm.request.duration";

/// Meter shared by every Fabula instrument
pub fn meter() -> Meter {
    opentelemetry::global::meter("fabula")
}

/// Monotonic counter with the given name
pub fn counter(name: &'static str) -> Counter<u64> {
    meter().u64_counter(name).build()
}

/// Duration histogram in seconds with the given name
pub fn duration_histogram(name: &'static str) -> Histogram<f64> {
    meter().f64_histogram(name).with_unit("s").build()
}

/// Histogram for upstream LLM request latency
pub fn llm_request_duration() -> Histogram<f64> {
    duration_histogram(LLM_REQUEST_DURATION)
}

/// Record a duration measurement on a histogram
pub fn record_duration(histogram: &Histogram<f64>, start: Instant, attributes: &[KeyValue]) {
    histogram.record(start.elapsed().as_secs_f64(), attributes);
}
