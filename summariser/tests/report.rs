use chrono::{DateTime, Local, TimeDelta, TimeZone};
use stress_harness_summariser::filter::latest_sessions_by_target_and_config;
use stress_harness_summariser::report::{render_report, runs_table};
use stress_harness_summariser::{FileReporter, Reporter, StatsAggregator};
use stress_harness_summary_model::{
    parse_duration_list, FailedRun, RunMetrics, RunRecord, RunSpec, SessionSummary,
    WorkloadMetrics,
};

fn t0() -> DateTime<Local> {
    Local
        .with_ymd_and_hms(2024, 3, 1, 10, 0, 0)
        .single()
        .expect("unambiguous local time")
}

fn record(index: usize, duration: &str, op_rate: u64, max: f64, start_s: i64, end_s: i64) -> RunRecord {
    RunRecord {
        spec: RunSpec::new(index, duration.parse().unwrap(), "some-scylla"),
        metrics: RunMetrics::new(
            WorkloadMetrics {
                op_rate,
                latency_mean_ms: 1.25,
                latency_99th_ms: 3.5,
                latency_max_ms: max,
            },
            t0() + TimeDelta::seconds(start_s),
            t0() + TimeDelta::seconds(end_s),
        )
        .unwrap(),
    }
}

fn session(runs: Vec<RunRecord>, failures: Vec<FailedRun>, durations: &str) -> SessionSummary {
    let mut aggregator = StatsAggregator::new();
    for run in &runs {
        aggregator.add(&run.metrics);
    }

    SessionSummary {
        session_id: "session".to_string(),
        target: "some-scylla".to_string(),
        durations: parse_duration_list(durations).unwrap(),
        workload_threads: 10,
        started_at: t0(),
        finished_at: t0() + TimeDelta::seconds(13),
        runs,
        failures,
        aggregate: aggregator.aggregate().ok(),
        harness_version: "0.2.0".to_string(),
    }
}

#[test]
fn renders_full_report() {
    let summary = session(
        vec![
            record(2, "12s", 2000, 15.0, 1, 12),
            record(1, "10s", 1000, 12.5, 0, 10),
            record(3, "9s", 1500, 11.0, 2, 9),
        ],
        vec![],
        "10s,12s,9s",
    );

    let expected = "\
Aggregated Results:
Number of stress processes that ran: 3
Succeeded: 3
Failed: 0

Process 1:
  Requested duration: 10s
  Start time: 2024-03-01 10:00:00
  End time: 2024-03-01 10:00:10
  Duration: 0:00:10

Process 2:
  Requested duration: 12s
  Start time: 2024-03-01 10:00:01
  End time: 2024-03-01 10:00:12
  Duration: 0:00:11

Process 3:
  Requested duration: 9s
  Start time: 2024-03-01 10:00:02
  End time: 2024-03-01 10:00:09
  Duration: 0:00:07

Test aggregated results:
Start time: 2024-03-01 10:00:00
End time: 2024-03-01 10:00:12
Test duration: 0:00:12
Aggregation of Op rate (sum): 4500 op/s
Average of Latency mean: 1.250 ms
Average of Latency 99th percentile: 3.500 ms
Standard deviation of Latency max: 2.021 ms
";

    pretty_assertions::assert_eq!(expected, render_report(&summary));
}

#[test]
fn report_lists_failed_runs_and_undefined_std_dev() {
    let summary = session(
        vec![record(1, "10s", 1000, 12.5, 0, 10)],
        vec![FailedRun {
            spec: RunSpec::new(2, "5s".parse().unwrap(), "some-scylla"),
            error: "Failed to parse workload output: missing 'Latency 99th percentile'"
                .to_string(),
        }],
        "10s,5s",
    );

    let report = render_report(&summary);

    assert!(report.contains("Number of stress processes that ran: 2\n"));
    assert!(report.contains("Succeeded: 1\nFailed: 1\n"));
    assert!(report.contains(
        "Process 2 failed:\n  Requested duration: 5s\n  Error: Failed to parse workload output: missing 'Latency 99th percentile'\n"
    ));
    assert!(report.contains("Aggregation of Op rate (sum): 1000 op/s\n"));
    assert!(report.contains("Standard deviation of Latency max: undefined"));

    let table = runs_table(&summary);
    assert!(table.contains("failed"));
    assert!(table.contains("1000"));
}

#[test]
fn report_without_successful_runs_uses_session_window() {
    let summary = session(
        vec![],
        vec![FailedRun {
            spec: RunSpec::new(1, "5s".parse().unwrap(), "missing-container"),
            error: "Failed to resolve address".to_string(),
        }],
        "5s",
    );
    assert!(summary.aggregate.is_none());

    let report = render_report(&summary);
    assert!(report.contains("No run completed, nothing to aggregate"));
    assert!(report.contains("Start time: 2024-03-01 10:00:00\nEnd time: 2024-03-01 10:00:13\n"));
}

#[test]
fn file_reporter_never_overwrites_a_report() {
    let dir = tempfile::tempdir().unwrap();
    let results_dir = dir.path().join("Results");
    let reporter = FileReporter::new(&results_dir).quiet();
    let summary = session(vec![record(1, "10s", 1000, 12.5, 0, 10)], vec![], "10s");

    let first = reporter.write(&summary).unwrap();
    let second = reporter.write(&summary).unwrap();

    assert_eq!(
        results_dir.join("Start_2024-03-01_10-00-00_End_2024-03-01_10-00-10.txt"),
        first
    );
    assert_eq!(
        results_dir.join("Start_2024-03-01_10-00-00_End_2024-03-01_10-00-10_1.txt"),
        second
    );
    assert_eq!(
        render_report(&summary),
        std::fs::read_to_string(first).unwrap()
    );

    reporter.report(&summary).unwrap();
    assert_eq!(3, std::fs::read_dir(&results_dir).unwrap().count());
}

#[test]
fn keeps_latest_session_per_configuration() {
    let mut older = session(vec![record(1, "10s", 1000, 12.5, 0, 10)], vec![], "10s,5s");
    older.session_id = "older".to_string();

    let mut newer = older.clone();
    newer.session_id = "newer".to_string();
    newer.started_at = older.started_at + TimeDelta::hours(1);

    let mut other_config = older.clone();
    other_config.session_id = "other".to_string();
    other_config.durations = parse_duration_list("1m").unwrap();

    let latest = latest_sessions_by_target_and_config(vec![older, newer, other_config]);

    let mut ids = latest
        .iter()
        .map(|(_, _, session)| session.session_id.as_str())
        .collect::<Vec<_>>();
    ids.sort();
    assert_eq!(vec!["newer", "other"], ids);
}
