//! Metric instrument factories for pcq.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an OTLP endpoint the global provider is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("pcq")
}

/// Counter: tickets accepted by a lane.
/// Labels: `lane`.
pub fn lane_submitted() -> Counter<u64> {
    meter()
        .u64_counter("pcq.lane.submitted")
        .with_description("Number of tickets submitted to a lane")
        .build()
}

/// Counter: tickets a lane worker finished.
/// Labels: `lane`, `result` ("resolved" | "failed").
pub fn lane_processed() -> Counter<u64> {
    meter()
        .u64_counter("pcq.lane.processed")
        .with_description("Number of tickets processed by a lane worker")
        .build()
}

/// Histogram: time spent inside the processing function.
/// Labels: `lane`.
pub fn lane_process_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("pcq.lane.process_duration_ms")
        .with_description("Processing function duration in milliseconds")
        .with_unit("ms")
        .build()
}
