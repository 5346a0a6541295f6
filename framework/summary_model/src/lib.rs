use std::io::{BufRead, Read, Write};
use std::path::Path;

mod duration;
mod run;
mod session;

pub use duration::{parse_duration_list, DurationUnit, InvalidDurationError, RunDuration};
pub use run::{InvalidRunWindowError, RunMetrics, RunSpec, WorkloadMetrics};
pub use session::{AggregateReport, FailedRun, RunRecord, SessionSummary};

/// Append the session summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_session_summary(summary: &SessionSummary, path: &Path) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_session_summary(summary, &mut file)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Serialize the session summary to a writer
pub fn store_session_summary<W: Write>(
    summary: &SessionSummary,
    writer: &mut W,
) -> anyhow::Result<()> {
    serde_json::to_writer(writer, summary)?;
    Ok(())
}

/// Load a session summary from a reader
pub fn load_session_summary<R: Read>(reader: R) -> anyhow::Result<SessionSummary> {
    let reader = std::io::BufReader::new(reader);
    let summary: SessionSummary = serde_json::from_reader(reader)?;
    Ok(summary)
}

/// Load session summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_session_summary]. Blank lines are skipped.
pub fn load_session_summaries(path: &Path) -> anyhow::Result<Vec<SessionSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut sessions = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let session: SessionSummary = serde_json::from_str(&line)?;
        sessions.push(session);
    }
    Ok(sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeDelta};

    fn sample_session(session_id: &str, durations: &str) -> SessionSummary {
        let started_at = Local::now();
        let spec = RunSpec::new(1, "10s".parse().unwrap(), "some-scylla");
        let metrics = RunMetrics::new(
            WorkloadMetrics {
                op_rate: 12_345,
                latency_mean_ms: 0.8,
                latency_99th_ms: 2.5,
                latency_max_ms: 40.1,
            },
            started_at,
            started_at + TimeDelta::seconds(10),
        )
        .unwrap();

        SessionSummary {
            session_id: session_id.to_string(),
            target: "some-scylla".to_string(),
            durations: parse_duration_list(durations).unwrap(),
            workload_threads: 10,
            started_at,
            finished_at: started_at + TimeDelta::seconds(11),
            runs: vec![RunRecord { spec: spec.clone(), metrics }],
            failures: vec![FailedRun {
                spec: RunSpec::new(2, "5s".parse().unwrap(), "some-scylla"),
                error: "exited with status 1".to_string(),
            }],
            aggregate: None,
            harness_version: "0.2.0".to_string(),
        }
    }

    #[test]
    fn append_then_load_session_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions.jsonl");

        let first = sample_session("first", "10s,5s");
        let second = sample_session("second", "10s,5s");
        append_session_summary(&first, &path).unwrap();
        append_session_summary(&second, &path).unwrap();

        let loaded = load_session_summaries(&path).unwrap();
        assert_eq!(vec![first, second], loaded);
    }

    #[test]
    fn fingerprint_ignores_duration_order_and_session_id() {
        let a = sample_session("a", "10s,5s");
        let b = sample_session("b", "5s,10s");
        assert_eq!(a.fingerprint(), b.fingerprint());

        let mut c = sample_session("c", "10s,5s");
        c.workload_threads = 20;
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn report_window_falls_back_to_session_window() {
        let session = sample_session("a", "10s,5s");
        assert_eq!(
            (session.started_at, session.finished_at),
            session.report_window()
        );
        assert_eq!(2, session.run_count());
        assert!(session.has_failures());
    }
}
