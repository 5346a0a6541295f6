use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use stress_harness_summariser::FileReporter;
use stress_harness_summary_model::append_session_summary;

use crate::cli::StressCli;
use crate::container::DockerResolver;
use crate::docker_binary::docker_path;
use crate::executor::Executor;
use crate::orchestrator::Orchestrator;
use crate::parser::CassandraStressParser;
use crate::progress::{BarProgress, LogProgress, ProgressObserver};
use crate::run_executor::RunExecutor;
use crate::shutdown::start_shutdown_listener;
use crate::workload::CassandraStress;

/// Environment variable that, when set, stops failed runs from failing the process.
pub const IGNORE_RUN_ERRORS_ENV: &str = "IGNORE_RUN_ERRORS";

/// Run one session: every requested duration concurrently against the configured container.
///
/// The session is reported even if some runs fail. Failed runs then fail the process, after the
/// report has been written, unless [IGNORE_RUN_ERRORS_ENV] is set.
pub fn run(cli: StressCli) -> anyhow::Result<()> {
    let specs = Orchestrator::plan(&cli.duration, &cli.container_name);
    let docker = docker_path()?;
    let session_id = nanoid::nanoid!();
    let threads = cli.threads.get();

    log::info!(
        "Starting session {session_id}: {} concurrent stress tests against container {}",
        specs.len(),
        cli.container_name
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to create Tokio runtime")?;
    let shutdown_handle = start_shutdown_listener(&runtime);
    let executor = Arc::new(Executor::new(runtime, shutdown_handle));

    let run_executor = Arc::new(RunExecutor::new(
        executor,
        Arc::new(DockerResolver::new(docker.clone())),
        Arc::new(CassandraStress::new(docker, cli.image, threads, &session_id)),
        Arc::new(CassandraStressParser),
    ));

    let progress: Arc<dyn ProgressObserver> = if cli.no_progress {
        Arc::new(LogProgress)
    } else {
        let planned_runtime = specs
            .iter()
            .map(|spec| spec.duration.as_std())
            .max()
            .unwrap_or(Duration::ZERO);
        Arc::new(BarProgress::new(specs.len(), planned_runtime)?)
    };

    let mut orchestrator = Orchestrator::new(
        session_id,
        run_executor,
        progress,
        Arc::new(FileReporter::new(&cli.results_dir)),
        threads,
    );
    let summary = orchestrator.run_session(specs)?;

    if let Some(summary_path) = &cli.summary_path {
        append_session_summary(&summary, summary_path).with_context(|| {
            format!(
                "Failed to append session summary to {}",
                summary_path.display()
            )
        })?;
        log::debug!("Session summary appended to {}", summary_path.display());
    }

    if summary.has_failures() {
        let error_message = format!(
            "{} out of {} runs failed:\n{}",
            summary.failures.len(),
            summary.run_count(),
            summary
                .failures
                .iter()
                .map(|failure| format!("  {}: {}", failure.spec, failure.error))
                .collect::<Vec<_>>()
                .join("\n")
        );

        if std::env::var(IGNORE_RUN_ERRORS_ENV).is_ok() {
            log::warn!("{}", error_message);
        } else {
            return Err(anyhow::anyhow!(error_message));
        }
    }

    Ok(())
}
