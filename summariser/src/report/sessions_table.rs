use itertools::Itertools;
use stress_harness_summary_model::SessionSummary;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::report::format_duration;

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Durations")]
    durations: String,
    #[tabled(rename = "Started")]
    started_at: String,
    #[tabled(rename = "Runs")]
    runs: String,
    #[tabled(rename = "Op rate sum (op/s)")]
    total_op_rate: String,
    #[tabled(rename = "Avg latency mean (ms)")]
    avg_latency_mean: String,
    #[tabled(rename = "Avg latency 99th (ms)")]
    avg_latency_99th: String,
    #[tabled(rename = "Std latency max (ms)")]
    stddev_latency_max: String,
    #[tabled(rename = "Span")]
    span: String,
}

impl From<&SessionSummary> for SessionRow {
    fn from(session: &SessionSummary) -> Self {
        let aggregate = session.aggregate.as_ref();

        Self {
            target: session.target.clone(),
            durations: session.durations.iter().join(","),
            started_at: session.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            runs: format!("{}/{}", session.runs.len(), session.run_count()),
            total_op_rate: aggregate
                .map(|a| a.total_op_rate.to_string())
                .unwrap_or_else(|| "-".to_string()),
            avg_latency_mean: aggregate
                .map(|a| format!("{:.3}", a.avg_latency_mean_ms))
                .unwrap_or_else(|| "-".to_string()),
            avg_latency_99th: aggregate
                .map(|a| format!("{:.3}", a.avg_latency_99th_ms))
                .unwrap_or_else(|| "-".to_string()),
            stddev_latency_max: aggregate
                .and_then(|a| a.stddev_latency_max_ms)
                .map(|std| format!("{std:.3}"))
                .unwrap_or_else(|| "undefined".to_string()),
            span: aggregate
                .map(|a| format_duration(a.total_duration()))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// A table with one row per session.
pub fn sessions_table<'a>(sessions: impl IntoIterator<Item = &'a SessionSummary>) -> String {
    let rows = sessions.into_iter().map(SessionRow::from).collect::<Vec<_>>();

    let mut table = Table::new(rows);
    table.with(Style::modern());

    table.to_string()
}
