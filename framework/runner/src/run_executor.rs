use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use stress_harness_summary_model::{RunMetrics, RunSpec};

use crate::container::TargetResolver;
use crate::error::{RunError, RunErrorKind};
use crate::executor::Executor;
use crate::parser::MetricsParser;
use crate::workload::Workload;

/// Executes one run: resolve the target, run the workload, parse its output.
///
/// Each call is independent, so one executor can be shared by every concurrent run of a session.
pub struct RunExecutor {
    executor: Arc<Executor>,
    resolver: Arc<dyn TargetResolver>,
    workload: Arc<dyn Workload>,
    parser: Arc<dyn MetricsParser>,
}

impl RunExecutor {
    pub fn new(
        executor: Arc<Executor>,
        resolver: Arc<dyn TargetResolver>,
        workload: Arc<dyn Workload>,
        parser: Arc<dyn MetricsParser>,
    ) -> Self {
        Self {
            executor,
            resolver,
            workload,
            parser,
        }
    }

    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    pub fn execute(&self, spec: &RunSpec) -> Result<RunMetrics, RunError> {
        self.try_execute(spec)
            .map_err(|kind| RunError::new(spec.clone(), kind))
    }

    fn try_execute(&self, spec: &RunSpec) -> Result<RunMetrics, RunErrorKind> {
        let address = self.resolver.resolve(&self.executor, &spec.target)?;

        let started_at = Local::now();
        let clock = Instant::now();
        let output = self.workload.invoke(&self.executor, spec, &address)?;
        let elapsed = clock.elapsed();

        if !output.success {
            return Err(RunErrorKind::Execution {
                status: output.status,
                stderr: output.stderr.trim().to_string(),
            });
        }

        let workload = self.parser.parse(&output.stdout)?;

        Ok(RunMetrics::from_elapsed(workload, started_at, elapsed))
    }
}
