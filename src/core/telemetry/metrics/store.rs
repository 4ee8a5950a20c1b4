//! Bounded outcome history and its aggregations

use super::types::{
    ErrorCount, KindMetrics, MetricsFilter, MetricsSummary, MetricsTimeline, ModelMetrics,
    TimelinePoint, TopErrors,
};
use crate::core::telemetry::{TaskOutcome, TelemetrySink};
use crate::utils::truncate_chars;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Longest window a query may cover; older samples are pruned on write
pub const MAX_WINDOW_HOURS: u32 = 168;

/// Error messages are grouped on this many leading chars
const ERROR_MESSAGE_CHARS: usize = 200;

#[derive(Debug, Clone)]
struct Sample {
    at: DateTime<Utc>,
    outcome: TaskOutcome,
}

/// Running totals over a set of outcomes
#[derive(Debug, Default)]
struct Totals {
    count: u64,
    success: u64,
    errors: u64,
    cost_usd: f64,
    tokens: u64,
    latency_ms: u64,
}

impl Totals {
    fn add(&mut self, outcome: &TaskOutcome) {
        self.count += 1;
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.errors += 1;
        }
        self.cost_usd += outcome.estimated_cost_usd.unwrap_or(0.0);
        self.tokens += outcome.usage.map_or(0, |u| u64::from(u.total_tokens));
        self.latency_ms += outcome.latency_ms;
    }

    fn avg_latency_ms(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.latency_ms / self.count
        }
    }
}

fn round_usd(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn matches(filter: &MetricsFilter, outcome: &TaskOutcome) -> bool {
    filter.kind.as_ref().is_none_or(|kind| *kind == outcome.kind)
        && filter
            .mode
            .as_ref()
            .is_none_or(|mode| outcome.mode.as_ref() == Some(mode))
        && filter
            .client_id
            .as_ref()
            .is_none_or(|client| *client == outcome.client_id)
}

/// Telemetry sink keeping recent outcomes for aggregate queries
///
/// Holds at most `capacity` samples and nothing older than
/// [`MAX_WINDOW_HOURS`]; the oldest sample goes first.
#[derive(Debug)]
pub struct MetricsStore {
    samples: RwLock<VecDeque<Sample>>,
    capacity: usize,
}

impl MetricsStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: RwLock::new(VecDeque::new()),
            capacity: capacity.max(1),
        }
    }

    /// Record an outcome observed at `at`
    pub fn record_at(&self, outcome: TaskOutcome, at: DateTime<Utc>) {
        let horizon = at - TimeDelta::hours(i64::from(MAX_WINDOW_HOURS));
        let mut samples = self.samples.write();
        while samples.front().is_some_and(|sample| sample.at < horizon) {
            samples.pop_front();
        }
        if samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(Sample { at, outcome });
    }

    pub fn len(&self) -> usize {
        self.samples.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.read().is_empty()
    }

    fn select(
        &self,
        hours: u32,
        filter: &MetricsFilter,
        now: DateTime<Utc>,
    ) -> Vec<(DateTime<Utc>, TaskOutcome)> {
        let cutoff = now - TimeDelta::hours(i64::from(hours));
        self.samples
            .read()
            .iter()
            .filter(|sample| sample.at >= cutoff && matches(filter, &sample.outcome))
            .map(|sample| (sample.at, sample.outcome.clone()))
            .collect()
    }

    /// Totals, success rate and per kind / per model breakdown for the last `hours`
    pub fn summary(&self, hours: u32, filter: &MetricsFilter) -> MetricsSummary {
        self.summary_at(hours, filter, Utc::now())
    }

    pub fn summary_at(&self, hours: u32, filter: &MetricsFilter, now: DateTime<Utc>) -> MetricsSummary {
        let mut total = Totals::default();
        let mut kinds: BTreeMap<String, Totals> = BTreeMap::new();
        let mut models: BTreeMap<String, Totals> = BTreeMap::new();

        for (_, outcome) in self.select(hours, filter, now) {
            total.add(&outcome);
            kinds.entry(outcome.kind.clone()).or_default().add(&outcome);
            models
                .entry(format!("{}:{}", outcome.provider, outcome.model))
                .or_default()
                .add(&outcome);
        }

        let success_rate = if total.count == 0 {
            0.0
        } else {
            total.success as f64 / total.count as f64
        };

        MetricsSummary {
            period_hours: hours,
            total_requests: total.count,
            success_count: total.success,
            error_count: total.errors,
            success_rate,
            total_cost_usd: round_usd(total.cost_usd),
            avg_latency_ms: total.avg_latency_ms(),
            total_tokens: total.tokens,
            by_kind: kinds
                .into_iter()
                .map(|(kind, t)| {
                    let metrics = KindMetrics {
                        count: t.count,
                        success: t.success,
                        errors: t.errors,
                        cost_usd: round_usd(t.cost_usd),
                        tokens: t.tokens,
                    };
                    (kind, metrics)
                })
                .collect(),
            by_model: models
                .into_iter()
                .map(|(model, t)| {
                    let metrics = ModelMetrics {
                        count: t.count,
                        cost_usd: round_usd(t.cost_usd),
                        tokens: t.tokens,
                        avg_latency_ms: t.avg_latency_ms(),
                    };
                    (model, metrics)
                })
                .collect(),
        }
    }

    /// Outcomes of the last `hours` grouped into `interval_minutes` buckets
    pub fn timeline(&self, hours: u32, interval_minutes: u32, filter: &MetricsFilter) -> MetricsTimeline {
        self.timeline_at(hours, interval_minutes, filter, Utc::now())
    }

    pub fn timeline_at(
        &self,
        hours: u32,
        interval_minutes: u32,
        filter: &MetricsFilter,
        now: DateTime<Utc>,
    ) -> MetricsTimeline {
        let interval_secs = i64::from(interval_minutes.max(1)) * 60;
        let mut buckets: BTreeMap<i64, Totals> = BTreeMap::new();

        for (at, outcome) in self.select(hours, filter, now) {
            let start = at.timestamp().div_euclid(interval_secs) * interval_secs;
            buckets.entry(start).or_default().add(&outcome);
        }

        let data = buckets
            .into_iter()
            .filter_map(|(start, t)| {
                DateTime::from_timestamp(start, 0).map(|timestamp| TimelinePoint {
                    timestamp,
                    count: t.count,
                    success_count: t.success,
                    error_count: t.errors,
                    cost_usd: round_usd(t.cost_usd),
                    avg_latency_ms: t.avg_latency_ms(),
                    total_tokens: t.tokens,
                })
            })
            .collect();

        MetricsTimeline {
            interval_minutes,
            period_hours: hours,
            data,
        }
    }

    /// Most frequent failure messages of the last `hours`
    pub fn top_errors(&self, hours: u32, limit: usize) -> TopErrors {
        self.top_errors_at(hours, limit, Utc::now())
    }

    pub fn top_errors_at(&self, hours: u32, limit: usize, now: DateTime<Utc>) -> TopErrors {
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_, outcome) in self.select(hours, &MetricsFilter::default(), now) {
            if outcome.is_success() {
                continue;
            }
            if let Some(error) = outcome.error.as_deref() {
                let message = truncate_chars(error, ERROR_MESSAGE_CHARS).to_string();
                *counts.entry(message).or_default() += 1;
            }
        }

        let mut errors: Vec<ErrorCount> = counts
            .into_iter()
            .map(|(message, count)| ErrorCount { message, count })
            .collect();
        errors.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.message.cmp(&b.message)));
        errors.truncate(limit);

        TopErrors {
            period_hours: hours,
            errors,
        }
    }
}

impl Default for MetricsStore {
    fn default() -> Self {
        Self::new(crate::config::models::default_metrics_capacity())
    }
}

impl TelemetrySink for MetricsStore {
    fn record(&self, outcome: TaskOutcome) {
        self.record_at(outcome, Utc::now());
    }
}
