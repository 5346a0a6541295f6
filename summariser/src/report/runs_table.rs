use std::collections::BTreeMap;
use stress_harness_summary_model::SessionSummary;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::report::format_duration;

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Duration")]
    duration: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Op rate (op/s)")]
    op_rate: String,
    #[tabled(rename = "Latency mean (ms)")]
    latency_mean: String,
    #[tabled(rename = "Latency 99th (ms)")]
    latency_99th: String,
    #[tabled(rename = "Latency max (ms)")]
    latency_max: String,
    #[tabled(rename = "Run time")]
    run_time: String,
}

/// One row per requested run, in request order, failed runs included.
pub fn runs_table(summary: &SessionSummary) -> String {
    let mut rows = BTreeMap::new();

    for record in &summary.runs {
        let workload = &record.metrics.workload;
        rows.insert(
            record.spec.index,
            RunRow {
                index: record.spec.index,
                duration: record.spec.duration.to_string(),
                status: "ok".to_string(),
                op_rate: workload.op_rate.to_string(),
                latency_mean: format!("{:.3}", workload.latency_mean_ms),
                latency_99th: format!("{:.3}", workload.latency_99th_ms),
                latency_max: format!("{:.3}", workload.latency_max_ms),
                run_time: format_duration(record.metrics.duration()),
            },
        );
    }

    for failure in &summary.failures {
        rows.insert(
            failure.spec.index,
            RunRow {
                index: failure.spec.index,
                duration: failure.spec.duration.to_string(),
                status: "failed".to_string(),
                op_rate: "-".to_string(),
                latency_mean: "-".to_string(),
                latency_99th: "-".to_string(),
                latency_max: "-".to_string(),
                run_time: "-".to_string(),
            },
        );
    }

    let mut table = Table::new(rows.into_values());
    table.with(Style::modern());

    table.to_string()
}
