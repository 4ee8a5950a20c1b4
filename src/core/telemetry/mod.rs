//! Task outcome telemetry
//!
//! Sinks are fire-and-forget: `record` never blocks the caller and never
//! fails.

mod jsonl;
pub mod metrics;
mod outcome;
mod sinks;

pub use jsonl::JsonlTelemetrySink;
pub use metrics::{MetricsFilter, MetricsStore};
pub use outcome::{OutcomeStatus, TaskOutcome};
pub use sinks::{FanoutTelemetrySink, MemoryTelemetrySink, TracingTelemetrySink};

/// Destination for terminal task outcomes
pub trait TelemetrySink: Send + Sync {
    fn record(&self, outcome: TaskOutcome);
}
