use anyhow::Context;
use chrono::Utc;
use log::debug;
use std::fs::File;
use std::path::PathBuf;
use stress_harness_summariser::filter::latest_sessions_by_target_and_config;
use stress_harness_summariser::report::sessions_table;
use stress_harness_summary_model::load_session_summaries;

/// Environment variable name to set a custom session summary file path
const RUN_SUMMARY_PATH_ENV: &str = "RUN_SUMMARY_PATH";
/// Default path for the session summary file
const DEFAULT_RUN_SUMMARY_PATH: &str = "session_summary.jsonl";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let summary_path = std::env::var(RUN_SUMMARY_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_RUN_SUMMARY_PATH));
    debug!("Loading sessions from {}", summary_path.display());
    let sessions = load_session_summaries(&summary_path).with_context(|| {
        format!(
            "Failed to load session summaries from {}",
            summary_path.display()
        )
    })?;

    let latest = latest_sessions_by_target_and_config(sessions);
    if latest.is_empty() {
        log::warn!("No sessions found in {}", summary_path.display());
        return Ok(());
    }

    for (target, fingerprint, session) in &latest {
        debug!(
            "Selected session {} for {target} ({fingerprint})",
            session.session_id
        );
    }

    println!("{}", sessions_table(latest.iter().map(|(_, _, session)| session)));

    let failed = latest
        .iter()
        .filter(|(_, _, session)| session.has_failures())
        .count();
    if failed > 0 {
        log::warn!("{failed} of {} sessions had failed runs", latest.len());
    }

    let report_path = format!(
        "summariser-report-{}.json",
        Utc::now().format("%Y-%m-%dT%H.%M.%S%.fZ")
    );
    let report = File::create_new(&report_path)
        .with_context(|| format!("Failed to create {report_path}"))?;
    let sessions = latest
        .into_iter()
        .map(|(_, _, session)| session)
        .collect::<Vec<_>>();
    serde_json::to_writer_pretty(report, &sessions)?;

    log::info!("Summary written to {report_path}");

    Ok(())
}
