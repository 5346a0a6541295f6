use chrono::{DateTime, Local, TimeDelta};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha3::Digest;

use crate::{RunDuration, RunMetrics, RunSpec};

/// Cross-run statistics computed from every successful run of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    /// The number of runs the statistics were computed from
    pub run_count: usize,
    /// Sum of the op rates of all runs, in operations per second
    pub total_op_rate: u64,
    pub avg_latency_mean_ms: f64,
    pub avg_latency_99th_ms: f64,
    /// Sample standard deviation of the max latencies
    ///
    /// Not defined when fewer than two runs contributed.
    pub stddev_latency_max_ms: Option<f64>,
    /// Earliest start of any run
    pub started_at: DateTime<Local>,
    /// Latest end of any run
    pub finished_at: DateTime<Local>,
}

impl AggregateReport {
    /// The wall-clock span covered by the runs.
    ///
    /// Runs overlap, so this is not the sum of the run durations.
    pub fn total_duration(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

/// A run that completed with metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub spec: RunSpec,
    pub metrics: RunMetrics,
}

/// A run that did not produce metrics, and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedRun {
    pub spec: RunSpec,
    pub error: String,
}

/// Summary of a session: every requested run, successful or not, plus the aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The unique session id
    ///
    /// Chosen by the runner. Unique for each session.
    pub session_id: String,
    /// The container that was put under load
    pub target: String,
    /// The requested durations, one per run, in request order
    pub durations: Vec<RunDuration>,
    /// The thread count each workload instance was configured with
    pub workload_threads: usize,
    /// When the first run was dispatched
    pub started_at: DateTime<Local>,
    /// When the last run was collected
    pub finished_at: DateTime<Local>,
    /// Successful runs in completion order
    pub runs: Vec<RunRecord>,
    /// Failed runs in completion order
    pub failures: Vec<FailedRun>,
    /// Not set when no run succeeded
    pub aggregate: Option<AggregateReport>,
    /// The version of the harness that ran the session
    pub harness_version: String,
}

impl SessionSummary {
    /// Total number of runs that were requested and accounted for.
    pub fn run_count(&self) -> usize {
        self.runs.len() + self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The window the report is named after. This is the window covered by the runs where any
    /// succeeded, otherwise the session window.
    pub fn report_window(&self) -> (DateTime<Local>, DateTime<Local>) {
        match &self.aggregate {
            Some(aggregate) => (aggregate.started_at, aggregate.finished_at),
            None => (self.started_at, self.finished_at),
        }
    }

    /// Compute a fingerprint for this session's configuration.
    ///
    /// It uses the
    ///     - Target
    ///     - Requested durations, irrespective of order
    ///     - Workload thread count
    ///     - Harness version
    ///
    /// The fingerprint is computed using [sha3::Sha3_256].
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.target.as_bytes());
        self.durations
            .iter()
            .map(|duration| duration.as_std().as_secs())
            .sorted()
            .for_each(|seconds| Digest::update(&mut hasher, seconds.to_le_bytes()));
        Digest::update(&mut hasher, (self.workload_threads as u64).to_le_bytes());
        Digest::update(&mut hasher, self.harness_version.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}
