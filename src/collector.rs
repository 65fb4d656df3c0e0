//! Result collection
//!
//! Workers push one [`RequestOutcome`] per dispatch into a shared
//! [`ResultCollector`]. Once every worker has joined, the collector is
//! finalized into a [`RunResult`] with counts and latency statistics.

use parking_lot::Mutex;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::client::Dispatch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Success,
    /// A response arrived with a non-2xx status.
    HttpFailure,
    /// No usable response: connect error, timeout, broken body.
    TransportFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub kind: OutcomeKind,
    pub status: Option<u16>,
    pub elapsed: Duration,
}

impl RequestOutcome {
    pub fn is_success(&self) -> bool {
        self.kind == OutcomeKind::Success
    }
}

impl From<&Dispatch> for RequestOutcome {
    fn from(d: &Dispatch) -> Self {
        let kind = if d.is_success() {
            OutcomeKind::Success
        } else if d.error.is_none() && d.status.is_some() {
            OutcomeKind::HttpFailure
        } else {
            OutcomeKind::TransportFailure
        };
        Self {
            kind,
            status: d.status,
            elapsed: d.elapsed,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyStats {
    pub count: usize,
    #[serde(rename = "min_ms", serialize_with = "as_millis")]
    pub min: Duration,
    #[serde(rename = "max_ms", serialize_with = "as_millis")]
    pub max: Duration,
    #[serde(rename = "mean_ms", serialize_with = "as_millis")]
    pub mean: Duration,
    #[serde(rename = "p50_ms", serialize_with = "as_millis")]
    pub p50: Duration,
    #[serde(rename = "p95_ms", serialize_with = "as_millis")]
    pub p95: Duration,
    #[serde(rename = "p99_ms", serialize_with = "as_millis")]
    pub p99: Duration,
}

impl LatencyStats {
    /// Summarise raw samples. Percentiles use the nearest-rank method.
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let n = sorted.len();
        let total: Duration = sorted.iter().sum();
        Self {
            count: n,
            min: sorted[0],
            max: sorted[n - 1],
            mean: total / n as u32,
            p50: nearest_rank(&sorted, 0.50),
            p95: nearest_rank(&sorted, 0.95),
            p99: nearest_rank(&sorted, 0.99),
        }
    }
}

fn nearest_rank(sorted: &[Duration], q: f64) -> Duration {
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

fn as_millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
}

/// Aggregate of a whole run.
///
/// `total_requests == success_count + failure_count` and
/// `failure_count == http_failures + transport_failures` always hold.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunResult {
    pub terms_found: usize,
    pub concurrency: usize,
    pub iteration_budget: usize,
    pub total_requests: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub http_failures: u64,
    pub transport_failures: u64,
    pub status_counts: BTreeMap<u16, u64>,
    pub latency: LatencyStats,
    pub cancelled: bool,
    #[serde(rename = "wall_time_ms", serialize_with = "as_millis")]
    pub wall_time: Duration,
}

impl RunResult {
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.success_count as f64 / self.total_requests as f64 * 100.0
    }

    pub fn requests_per_second(&self) -> f64 {
        let secs = self.wall_time.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.total_requests as f64 / secs
    }
}

#[derive(Debug, Default)]
struct Tally {
    success: u64,
    http_failures: u64,
    transport_failures: u64,
    status_counts: BTreeMap<u16, u64>,
    samples: Vec<Duration>,
}

/// Thread-safe accumulator shared by all workers.
#[derive(Debug, Default)]
pub struct ResultCollector {
    tally: Mutex<Tally>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: RequestOutcome) {
        let mut t = self.tally.lock();
        match outcome.kind {
            OutcomeKind::Success => t.success += 1,
            OutcomeKind::HttpFailure => t.http_failures += 1,
            OutcomeKind::TransportFailure => t.transport_failures += 1,
        }
        if let Some(code) = outcome.status {
            *t.status_counts.entry(code).or_default() += 1;
        }
        t.samples.push(outcome.elapsed);
    }

    /// Requests recorded so far.
    pub fn recorded(&self) -> u64 {
        self.tally.lock().samples.len() as u64
    }

    /// Snapshot of counts and latency statistics. Run-level fields
    /// (`terms_found`, `concurrency`, ...) are left for the caller to fill in.
    pub fn finalize(&self) -> RunResult {
        let t = self.tally.lock();
        let failure_count = t.http_failures + t.transport_failures;
        RunResult {
            total_requests: t.success + failure_count,
            success_count: t.success,
            failure_count,
            http_failures: t.http_failures,
            transport_failures: t.transport_failures,
            status_counts: t.status_counts.clone(),
            latency: LatencyStats::from_samples(&t.samples),
            ..RunResult::default()
        }
    }
}
