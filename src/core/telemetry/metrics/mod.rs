//! In-memory outcome aggregation
//!
//! `MetricsStore` is a telemetry sink that keeps recent outcomes and answers
//! the summary, timeline and top-error queries served under `/ai/metrics`.

mod store;
mod types;


pub use store::{MAX_WINDOW_HOURS, MetricsStore};
pub use types::{
    ErrorCount, KindMetrics, MetricsFilter, MetricsSummary, MetricsTimeline, ModelMetrics,
    TimelinePoint, TopErrors,
};
