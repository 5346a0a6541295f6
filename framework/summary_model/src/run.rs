use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::RunDuration;

/// One requested run: a duration to run the workload for against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Position of the run in the request, starting at 1.
    pub index: usize,
    pub duration: RunDuration,
    /// The name of the container under test.
    pub target: String,
}

impl RunSpec {
    pub fn new(index: usize, duration: RunDuration, target: impl Into<String>) -> Self {
        Self {
            index,
            duration,
            target: target.into(),
        }
    }
}

impl Display for RunSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "run {} ({} against '{}')",
            self.index, self.duration, self.target
        )
    }
}

/// The performance figures reported by the workload tool for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadMetrics {
    /// Operations per second.
    pub op_rate: u64,
    pub latency_mean_ms: f64,
    pub latency_99th_ms: f64,
    pub latency_max_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Run finished at {finished_at} which is before it started at {started_at}")]
pub struct InvalidRunWindowError {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

/// Metrics of one completed run along with the wall-clock window it ran in.
///
/// The window is never inverted, `finished_at >= started_at` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRunMetrics")]
pub struct RunMetrics {
    #[serde(flatten)]
    pub workload: WorkloadMetrics,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
}

/// Stored form of [RunMetrics], checked by [RunMetrics::new] before use.
#[derive(Deserialize)]
struct RawRunMetrics {
    #[serde(flatten)]
    workload: WorkloadMetrics,
    started_at: DateTime<Local>,
    finished_at: DateTime<Local>,
}

impl TryFrom<RawRunMetrics> for RunMetrics {
    type Error = InvalidRunWindowError;

    fn try_from(raw: RawRunMetrics) -> Result<Self, Self::Error> {
        RunMetrics::new(raw.workload, raw.started_at, raw.finished_at)
    }
}

impl RunMetrics {
    pub fn new(
        workload: WorkloadMetrics,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
    ) -> Result<Self, InvalidRunWindowError> {
        if finished_at < started_at {
            return Err(InvalidRunWindowError {
                started_at,
                finished_at,
            });
        }

        Ok(Self {
            workload,
            started_at,
            finished_at,
        })
    }

    /// Build the window from a wall-clock start and a monotonic elapsed time, so that a clock
    /// adjustment during the run cannot invert the window.
    pub fn from_elapsed(
        workload: WorkloadMetrics,
        started_at: DateTime<Local>,
        elapsed: std::time::Duration,
    ) -> Self {
        let finished_at = TimeDelta::from_std(elapsed)
            .ok()
            .and_then(|elapsed| started_at.checked_add_signed(elapsed))
            .unwrap_or(started_at);

        Self {
            workload,
            started_at,
            finished_at,
        }
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Local> {
        self.finished_at
    }

    pub fn duration(&self) -> TimeDelta {
        self.finished_at - self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workload() -> WorkloadMetrics {
        WorkloadMetrics {
            op_rate: 1000,
            latency_mean_ms: 1.5,
            latency_99th_ms: 4.0,
            latency_max_ms: 12.5,
        }
    }

    #[test]
    fn rejects_inverted_window() {
        let start = Local::now();
        let end = start - TimeDelta::seconds(1);

        let err = RunMetrics::new(workload(), start, end).unwrap_err();
        assert_eq!(start, err.started_at);
    }

    #[test]
    fn stored_window_is_checked_when_loaded() {
        let json = |started_at: &str, finished_at: &str| {
            format!(
                r#"{{"op_rate":1000,"latency_mean_ms":1.5,"latency_99th_ms":4.0,"latency_max_ms":12.5,"started_at":"{started_at}","finished_at":"{finished_at}"}}"#
            )
        };

        let err = serde_json::from_str::<RunMetrics>(&json(
            "2024-03-01T10:00:10+00:00",
            "2024-03-01T10:00:00+00:00",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("before it started"), "{err}");

        let metrics = serde_json::from_str::<RunMetrics>(&json(
            "2024-03-01T10:00:00+00:00",
            "2024-03-01T10:00:10+00:00",
        ))
        .unwrap();
        assert_eq!(1000, metrics.workload.op_rate);
        assert_eq!(TimeDelta::seconds(10), metrics.duration());
    }

    #[test]
    fn stored_metrics_load_back() {
        let start = Local::now();
        let metrics = RunMetrics::from_elapsed(workload(), start, std::time::Duration::from_secs(3));

        let json = serde_json::to_string(&metrics).unwrap();
        assert_eq!(metrics, serde_json::from_str::<RunMetrics>(&json).unwrap());
    }

    #[test]
    fn zero_length_window_is_allowed() {
        let start = Local::now();
        let metrics = RunMetrics::new(workload(), start, start).unwrap();
        assert_eq!(TimeDelta::zero(), metrics.duration());
    }

    #[test]
    fn window_from_elapsed() {
        let start = Local::now();
        let metrics = RunMetrics::from_elapsed(workload(), start, std::time::Duration::from_secs(25));

        assert_eq!(start, metrics.started_at());
        assert_eq!(TimeDelta::seconds(25), metrics.duration());
    }

    #[test]
    fn run_spec_names_itself() {
        let spec = RunSpec::new(2, "5m".parse().unwrap(), "some-scylla");
        assert_eq!("run 2 (5m against 'some-scylla')", spec.to_string());
    }
}
