//! Bounded buffer of recent request records.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Number of records kept when no capacity is configured.
pub const DEFAULT_CAPACITY: usize = 200;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Local wall clock, second resolution.
    pub timestamp: String,
    pub model: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Always `prompt_tokens + completion_tokens`.
    pub total_tokens: u64,
    /// Seconds, rounded to two decimals.
    pub latency: f64,
    /// Rounded to two decimals.
    pub tokens_per_sec: f64,
}

impl MetricRecord {
    /// Build a record stamped with the current local time.
    ///
    /// Missing counts become zero; negative or non-finite floats become zero;
    /// a missing model becomes `unknown` and a repo-style id keeps its last
    /// path segment.
    pub fn new(
        model: Option<&str>,
        prompt_tokens: Option<u64>,
        completion_tokens: Option<u64>,
        latency: Option<f64>,
        tokens_per_sec: Option<f64>,
    ) -> Self {
        let prompt_tokens = prompt_tokens.unwrap_or(0);
        let completion_tokens = completion_tokens.unwrap_or(0);
        Self {
            timestamp: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            model: model_name(model),
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
            latency: round2(non_negative(latency)),
            tokens_per_sec: round2(non_negative(tokens_per_sec)),
        }
    }
}

/// Aggregates over the current buffer contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_requests: usize,
    pub avg_tokens_per_sec: f64,
    pub total_prompt_tokens: u64,
    pub total_completion_tokens: u64,
}

/// Body of `GET /v1/metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub requests: Vec<MetricRecord>,
    pub summary: Summary,
}

/// Thread-safe FIFO ring of the most recent records.
///
/// Appends take one short lock, so each record lands whole and a full buffer
/// evicts exactly one record per append. Reads copy under the same lock.
#[derive(Debug)]
pub struct MetricsBuffer {
    capacity: usize,
    records: Mutex<VecDeque<MetricRecord>>,
}

impl Default for MetricsBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl MetricsBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Record one completed request. Never fails.
    pub fn record(
        &self,
        model: Option<&str>,
        prompt_tokens: Option<u64>,
        completion_tokens: Option<u64>,
        latency: Option<f64>,
        tokens_per_sec: Option<f64>,
    ) {
        self.push(MetricRecord::new(
            model,
            prompt_tokens,
            completion_tokens,
            latency,
            tokens_per_sec,
        ));
    }

    /// Append a prepared record, evicting the oldest when full.
    pub fn push(&self, record: MetricRecord) {
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record);
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<MetricRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Recompute aggregates over the current contents.
    pub fn summarize(&self) -> Summary {
        let records = self.records.lock();
        summarize(records.iter())
    }

    /// Records plus summary taken from one consistent view.
    pub fn report(&self) -> MetricsReport {
        let requests = self.snapshot();
        let summary = summarize(requests.iter());
        MetricsReport { requests, summary }
    }
}

fn summarize<'a>(records: impl ExactSizeIterator<Item = &'a MetricRecord>) -> Summary {
    let total_requests = records.len();
    let mut tps_sum = 0.0;
    let mut total_prompt_tokens = 0u64;
    let mut total_completion_tokens = 0u64;
    for r in records {
        tps_sum += r.tokens_per_sec;
        total_prompt_tokens = total_prompt_tokens.saturating_add(r.prompt_tokens);
        total_completion_tokens = total_completion_tokens.saturating_add(r.completion_tokens);
    }
    let avg_tokens_per_sec = if total_requests > 0 {
        round2(tps_sum / total_requests as f64)
    } else {
        0.0
    };
    Summary {
        total_requests,
        avg_tokens_per_sec,
        total_prompt_tokens,
        total_completion_tokens,
    }
}

fn model_name(model: Option<&str>) -> String {
    match model.and_then(|m| m.rsplit('/').next()) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "unknown".to_string(),
    }
}

fn non_negative(v: Option<f64>) -> f64 {
    match v {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(tps: f64) -> MetricRecord {
        MetricRecord::new(Some("m"), Some(1), Some(2), Some(0.5), Some(tps))
    }

    #[test]
    fn overflow_keeps_most_recent_in_order() {
        let buf = MetricsBuffer::with_capacity(3);
        for i in 0..5u64 {
            buf.record(Some("m"), Some(i), Some(0), Some(1.0), Some(1.0));
        }
        let prompts: Vec<u64> = buf.snapshot().iter().map(|r| r.prompt_tokens).collect();
        assert_eq!(prompts, vec![2, 3, 4]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn default_capacity_bound() {
        let buf = MetricsBuffer::new();
        for i in 0..(DEFAULT_CAPACITY as u64 + 7) {
            buf.record(None, Some(i), None, None, None);
        }
        let snap = buf.snapshot();
        assert_eq!(snap.len(), DEFAULT_CAPACITY);
        assert_eq!(snap[0].prompt_tokens, 7);
        assert_eq!(snap[DEFAULT_CAPACITY - 1].prompt_tokens, DEFAULT_CAPACITY as u64 + 6);
    }

    #[test]
    fn summary_averages_tokens_per_sec() {
        let buf = MetricsBuffer::new();
        for tps in [10.0, 20.0, 30.0] {
            buf.push(rec(tps));
        }
        let s = buf.summarize();
        assert_eq!(s.total_requests, 3);
        assert_eq!(s.avg_tokens_per_sec, 20.0);
        assert_eq!(s.total_prompt_tokens, 3);
        assert_eq!(s.total_completion_tokens, 6);
    }

    #[test]
    fn empty_summary_is_zero() {
        let s = MetricsBuffer::new().summarize();
        assert_eq!(s.total_requests, 0);
        assert_eq!(s.avg_tokens_per_sec, 0.0);
        assert_eq!(s.total_prompt_tokens, 0);
    }

    #[test]
    fn record_coerces_missing_and_bad_inputs() {
        let r = MetricRecord::new(None, None, Some(5), Some(f64::NAN), Some(-3.0));
        assert_eq!(r.model, "unknown");
        assert_eq!(r.prompt_tokens, 0);
        assert_eq!(r.total_tokens, 5);
        assert_eq!(r.latency, 0.0);
        assert_eq!(r.tokens_per_sec, 0.0);
    }

    #[test]
    fn record_trims_repo_prefix_and_rounds() {
        let r = MetricRecord::new(
            Some("mlx-community/Qwen2-VL-2B-Instruct-4bit"),
            Some(10),
            Some(20),
            Some(1.23456),
            Some(16.199),
        );
        assert_eq!(r.model, "Qwen2-VL-2B-Instruct-4bit");
        assert_eq!(r.total_tokens, 30);
        assert_eq!(r.latency, 1.23);
        assert_eq!(r.tokens_per_sec, 16.2);
        assert_eq!(r.timestamp.len(), "2024-01-01 00:00:00".len());
    }

    #[test]
    fn report_serializes_expected_shape() {
        let buf = MetricsBuffer::new();
        buf.push(rec(12.5));
        let v = serde_json::to_value(buf.report()).unwrap();
        assert_eq!(v["summary"]["total_requests"], 1);
        assert_eq!(v["summary"]["avg_tokens_per_sec"], 12.5);
        let first = &v["requests"][0];
        for key in [
            "timestamp",
            "model",
            "prompt_tokens",
            "completion_tokens",
            "total_tokens",
            "latency",
            "tokens_per_sec",
        ] {
            assert!(first.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn concurrent_appends_stay_bounded() {
        use std::sync::Arc;

        let buf = Arc::new(MetricsBuffer::with_capacity(50));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let buf = Arc::clone(&buf);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        buf.record(Some("m"), Some(1), Some(1), Some(0.1), Some(1.0));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(buf.len(), 50);
        assert!(buf.snapshot().iter().all(|r| r.total_tokens == 2));
    }
}
