use indicatif::{ProgressBar, ProgressState, ProgressStyle};
use std::fmt::Write;
use std::time::Duration;
use stress_harness_summary_model::{RunMetrics, RunSpec};

use crate::error::RunError;

/// Notified as a session moves along. Called from the collecting thread only.
pub trait ProgressObserver: Send + Sync {
    fn run_dispatched(&self, _spec: &RunSpec) {}

    /// Called once per run, in completion order, with `finished` counting up to `total`.
    fn run_finished(&self, finished: usize, total: usize, outcome: &Result<RunMetrics, RunError>);

    fn session_finished(&self) {}
}

/// Reports progress through the log only. Recommended for CI where nobody watches a progress bar.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn run_dispatched(&self, spec: &RunSpec) {
        log::debug!("Dispatched {spec}");
    }

    fn run_finished(&self, finished: usize, total: usize, outcome: &Result<RunMetrics, RunError>) {
        log_outcome(finished, total, outcome);
    }
}

fn log_outcome(finished: usize, total: usize, outcome: &Result<RunMetrics, RunError>) {
    log::info!("Finished {finished}/{total}");
    if let Err(e) = outcome {
        log::error!("{e}");
    }
}

/// Displays a progress bar of finished runs, with the elapsed time against the longest run.
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new(total: usize, planned_runtime: Duration) -> anyhow::Result<Self> {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{wide_bar:.cyan/blue}] {pos}/{len} finished [{elapsed_precise} / {planned_runtime}]",
            )?
            .with_key("planned_runtime", {
                let hours = planned_runtime.as_secs() / 3600;
                let minutes = (planned_runtime.as_secs() % 3600) / 60;
                let seconds = planned_runtime.as_secs() % 60;
                move |_state: &ProgressState, w: &mut dyn Write| {
                    let _ = write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds);
                }
            })
            .progress_chars("#>-"),
        );
        bar.enable_steady_tick(Duration::from_secs(1));

        Ok(Self { bar })
    }
}

impl ProgressObserver for BarProgress {
    fn run_finished(&self, finished: usize, total: usize, outcome: &Result<RunMetrics, RunError>) {
        self.bar.set_position(finished as u64);
        self.bar.suspend(|| log_outcome(finished, total, outcome));
    }

    fn session_finished(&self) {
        log::trace!("Progress bar shutting down");
        self.bar.finish_and_clear();
    }
}
