//! Metrics query and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Optional narrowing of the outcomes a query looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MetricsFilter {
    pub kind: Option<String>,
    pub mode: Option<String>,
    pub client_id: Option<String>,
}

/// Per task kind totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KindMetrics {
    pub count: u64,
    pub success: u64,
    pub errors: u64,
    pub cost_usd: f64,
    pub tokens: u64,
}

/// Per `provider:model` totals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub count: u64,
    pub cost_usd: f64,
    pub tokens: u64,
    pub avg_latency_ms: u64,
}

/// Aggregate over a time window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub period_hours: u32,
    pub total_requests: u64,
    pub success_count: u64,
    pub error_count: u64,
    /// Fraction in `0.0..=1.0`
    pub success_rate: f64,
    pub total_cost_usd: f64,
    pub avg_latency_ms: u64,
    pub total_tokens: u64,
    pub by_kind: BTreeMap<String, KindMetrics>,
    pub by_model: BTreeMap<String, ModelMetrics>,
}

/// One time bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Bucket start
    pub timestamp: DateTime<Utc>,
    pub count: u64,
    pub success_count: u64,
    pub error_count: u64,
    pub cost_usd: f64,
    pub avg_latency_ms: u64,
    pub total_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsTimeline {
    pub interval_minutes: u32,
    pub period_hours: u32,
    /// Non-empty buckets, oldest first
    pub data: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCount {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopErrors {
    pub period_hours: u32,
    /// Most frequent first
    pub errors: Vec<ErrorCount>,
}
