use chrono::{DateTime, Local};
use stress_harness_summary_model::{AggregateReport, RunMetrics};

use crate::analyze::{mean, sample_std_dev, total, AggregationError};

/// Accumulates the metrics of completed runs, one entry per run in the order they were added.
///
/// Not synchronised. Concurrent producers must serialise their calls to [StatsAggregator::add],
/// for example by holding the aggregator behind a mutex.
#[derive(Debug, Default, Clone)]
pub struct StatsAggregator {
    op_rates: Vec<u64>,
    latency_means: Vec<f64>,
    latency_99ths: Vec<f64>,
    latency_maxes: Vec<f64>,
    started_ats: Vec<DateTime<Local>>,
    finished_ats: Vec<DateTime<Local>>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the metrics of one completed run.
    pub fn add(&mut self, metrics: &RunMetrics) {
        self.op_rates.push(metrics.workload.op_rate);
        self.latency_means.push(metrics.workload.latency_mean_ms);
        self.latency_99ths.push(metrics.workload.latency_99th_ms);
        self.latency_maxes.push(metrics.workload.latency_max_ms);
        self.started_ats.push(metrics.started_at());
        self.finished_ats.push(metrics.finished_at());
    }

    pub fn len(&self) -> usize {
        self.op_rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.op_rates.is_empty()
    }

    /// Compute the aggregate over everything recorded so far.
    ///
    /// Can be called at any point. With a single run recorded, the standard deviation of the max
    /// latency is not defined and is reported as `None`.
    pub fn aggregate(&self) -> Result<AggregateReport, AggregationError> {
        let started_at = self
            .started_ats
            .iter()
            .min()
            .copied()
            .ok_or(AggregationError::NoRuns)?;
        let finished_at = self
            .finished_ats
            .iter()
            .max()
            .copied()
            .ok_or(AggregationError::NoRuns)?;

        let stddev_latency_max_ms = match sample_std_dev(&self.latency_maxes) {
            Ok(std) => Some(std),
            Err(e) => {
                log::debug!("Standard deviation of latency max is undefined: {e}");
                None
            }
        };

        Ok(AggregateReport {
            run_count: self.len(),
            total_op_rate: total(&self.op_rates),
            avg_latency_mean_ms: mean(&self.latency_means)?,
            avg_latency_99th_ms: mean(&self.latency_99ths)?,
            stddev_latency_max_ms,
            started_at,
            finished_at,
        })
    }
}
