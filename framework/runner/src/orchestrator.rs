use anyhow::Context;
use chrono::Local;
use parking_lot::Mutex;
use std::sync::mpsc;
use std::sync::Arc;
use stress_harness_summariser::{Reporter, StatsAggregator};
use stress_harness_summary_model::{
    FailedRun, RunDuration, RunMetrics, RunRecord, RunSpec, SessionSummary,
};

use crate::error::{RunError, RunErrorKind};
use crate::progress::ProgressObserver;
use crate::run_executor::RunExecutor;

pub type RunOutcome = Result<RunMetrics, RunError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    /// Every run has been handed to its own thread.
    Dispatched,
    /// Outcomes are being collected in completion order.
    Collecting,
    Reported,
    Failed,
}

impl SessionState {
    /// Whether a session in this state may move to `next`.
    pub fn can_advance_to(self, next: SessionState) -> bool {
        use SessionState::*;

        matches!(
            (self, next),
            (Idle, Dispatched)
                | (Dispatched, Collecting)
                | (Collecting, Reported)
                | (Collecting, Failed)
        )
    }
}

/// Runs every run of a session concurrently, collects the outcomes and reports them.
///
/// Runs fail independently. A failed run is recorded alongside the successful ones and never
/// stops its siblings, so the report always accounts for every requested run.
pub struct Orchestrator {
    session_id: String,
    run_executor: Arc<RunExecutor>,
    progress: Arc<dyn ProgressObserver>,
    reporter: Arc<dyn Reporter>,
    workload_threads: usize,
    state: SessionState,
}

impl Orchestrator {
    pub fn new(
        session_id: String,
        run_executor: Arc<RunExecutor>,
        progress: Arc<dyn ProgressObserver>,
        reporter: Arc<dyn Reporter>,
        workload_threads: usize,
    ) -> Self {
        Self {
            session_id,
            run_executor,
            progress,
            reporter,
            workload_threads,
            state: SessionState::Idle,
        }
    }

    /// One run per requested duration, all against the same target.
    pub fn plan(durations: &[RunDuration], target: &str) -> Vec<RunSpec> {
        durations
            .iter()
            .enumerate()
            .map(|(i, duration)| RunSpec::new(i + 1, *duration, target))
            .collect()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn advance(&mut self, next: SessionState) -> anyhow::Result<()> {
        if !self.state.can_advance_to(next) {
            anyhow::bail!(
                "Session {} cannot move from {:?} to {:?}",
                self.session_id,
                self.state,
                next
            );
        }
        log::debug!("Session {} is now {next:?}", self.session_id);
        self.state = next;
        Ok(())
    }

    pub fn run_session(&mut self, specs: Vec<RunSpec>) -> anyhow::Result<SessionSummary> {
        if self.state != SessionState::Idle {
            anyhow::bail!("Session {} has already been run", self.session_id);
        }
        let target = match specs.first() {
            Some(spec) => spec.target.clone(),
            None => anyhow::bail!("No runs requested"),
        };

        self.advance(SessionState::Dispatched)?;
        let total = specs.len();
        let started_at = Local::now();
        let stats = Arc::new(Mutex::new(StatsAggregator::new()));
        let (sender, receiver) = mpsc::channel::<(RunSpec, RunOutcome)>();

        let mut handles = Vec::with_capacity(total);
        for spec in &specs {
            self.progress.run_dispatched(spec);

            let run_executor = self.run_executor.clone();
            let stats = stats.clone();
            let run_sender = sender.clone();
            let run_spec = spec.clone();

            let spawned = std::thread::Builder::new()
                .name(format!("run-{}", spec.index))
                .spawn(move || {
                    let outcome = run_executor.execute(&run_spec);
                    if let Ok(metrics) = &outcome {
                        stats.lock().add(metrics);
                    }
                    // Only fails if the collector is gone, in which case nobody wants the outcome
                    let _ = run_sender.send((run_spec, outcome));
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    let error = RunError::new(
                        spec.clone(),
                        RunErrorKind::Aborted {
                            reason: format!("Failed to spawn thread for run: {e}"),
                        },
                    );
                    let _ = sender.send((spec.clone(), Err(error)));
                }
            }
        }
        // The receiver ends once the last run has reported
        drop(sender);
        log::debug!("Dispatched {total} runs for session {}", self.session_id);

        self.advance(SessionState::Collecting)?;
        let mut outcomes: Vec<(RunSpec, RunOutcome)> = Vec::with_capacity(total);
        for (spec, outcome) in receiver.iter() {
            self.progress.run_finished(outcomes.len() + 1, total, &outcome);
            outcomes.push((spec, outcome));
        }

        for handle in handles {
            if handle.join().is_err() {
                log::error!("A run thread panicked");
            }
        }

        // A run whose thread died before reporting is still accounted for
        for spec in &specs {
            if !outcomes.iter().any(|(done, _)| done.index == spec.index) {
                let error = RunError::new(
                    spec.clone(),
                    RunErrorKind::Aborted {
                        reason: "Run thread terminated without reporting an outcome".to_string(),
                    },
                );
                let outcome = Err(error);
                self.progress.run_finished(outcomes.len() + 1, total, &outcome);
                outcomes.push((spec.clone(), outcome));
            }
        }

        self.progress.session_finished();

        let aggregate = match stats.lock().aggregate() {
            Ok(aggregate) => Some(aggregate),
            Err(e) => {
                log::warn!("Nothing to aggregate for session {}: {e}", self.session_id);
                None
            }
        };

        let mut runs = Vec::new();
        let mut failures = Vec::new();
        for (spec, outcome) in outcomes {
            match outcome {
                Ok(metrics) => runs.push(RunRecord { spec, metrics }),
                Err(e) => failures.push(FailedRun {
                    spec,
                    error: e.kind.to_string(),
                }),
            }
        }

        let summary = SessionSummary {
            session_id: self.session_id.clone(),
            target,
            durations: specs.iter().map(|spec| spec.duration).collect(),
            workload_threads: self.workload_threads,
            started_at,
            finished_at: Local::now(),
            runs,
            failures,
            aggregate,
            harness_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        if let Err(e) = self.reporter.report(&summary) {
            self.advance(SessionState::Failed)?;
            return Err(e).context("Failed to report session results");
        }
        self.advance(SessionState::Reported)?;

        Ok(summary)
    }
}
