mod runs_table;
mod sessions_table;

use anyhow::Context;
use chrono::{DateTime, Local, TimeDelta};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use stress_harness_summary_model::SessionSummary;

pub use runs_table::runs_table;
pub use sessions_table::sessions_table;

/// Default directory that report files are written to.
pub const DEFAULT_RESULTS_DIR: &str = "Results";

const FILE_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const DISPLAY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Receives the outcome of a session once every run has been collected.
pub trait Reporter: Send + Sync {
    fn report(&self, summary: &SessionSummary) -> anyhow::Result<()>;
}

/// Writes a text report per session and echoes it to the console.
#[derive(Debug, Clone)]
pub struct FileReporter {
    results_dir: PathBuf,
    echo: bool,
}

impl FileReporter {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            echo: true,
        }
    }

    /// Do not print the report to stdout after writing it.
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    /// Write the report file and return where it was written.
    ///
    /// The file name is derived from the session's report window. An existing report is never
    /// overwritten, a numeric suffix is added instead.
    pub fn write(&self, summary: &SessionSummary) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.results_dir).with_context(|| {
            format!(
                "Failed to create results directory {}",
                self.results_dir.display()
            )
        })?;

        let (started_at, finished_at) = summary.report_window();
        let base_name = report_file_stem(started_at, finished_at);
        let content = render_report(summary);

        let (path, mut file) = create_unique(&self.results_dir, &base_name)?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        Ok(path)
    }
}

impl Reporter for FileReporter {
    fn report(&self, summary: &SessionSummary) -> anyhow::Result<()> {
        let path = self.write(summary)?;

        if self.echo {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read back report {}", path.display()))?;
            println!("\nResults: \n");
            println!("{content}");
            println!("{}", runs_table(summary));
            println!("Results saved to {}", path.display());
        }

        log::info!("Results saved to {}", path.display());

        Ok(())
    }
}

/// The report file name, without directory or collision suffix.
pub fn report_file_stem(started_at: DateTime<Local>, finished_at: DateTime<Local>) -> String {
    format!(
        "Start_{}_End_{}",
        started_at.format(FILE_TIME_FORMAT),
        finished_at.format(FILE_TIME_FORMAT)
    )
}

fn create_unique(dir: &Path, base_name: &str) -> anyhow::Result<(PathBuf, std::fs::File)> {
    for attempt in 0..1000 {
        let file_name = if attempt == 0 {
            format!("{base_name}.txt")
        } else {
            format!("{base_name}_{attempt}.txt")
        };
        let path = dir.join(file_name);

        match std::fs::File::create_new(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create {}", path.display()))
            }
        }
    }

    anyhow::bail!(
        "Too many reports named {base_name} in {}",
        dir.display()
    )
}

/// Format a duration as `H:MM:SS`, dropping fractional seconds.
pub fn format_duration(duration: TimeDelta) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn format_time(time: DateTime<Local>) -> String {
    time.format(DISPLAY_TIME_FORMAT).to_string()
}

/// Render the human readable report for a session.
pub fn render_report(summary: &SessionSummary) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_report(&mut out, summary);
    out
}

fn write_report(out: &mut String, summary: &SessionSummary) -> std::fmt::Result {
    writeln!(out, "Aggregated Results:")?;
    writeln!(
        out,
        "Number of stress processes that ran: {}",
        summary.run_count()
    )?;
    writeln!(out, "Succeeded: {}", summary.runs.len())?;
    writeln!(out, "Failed: {}", summary.failures.len())?;

    let mut runs = summary.runs.iter().collect::<Vec<_>>();
    runs.sort_by_key(|record| record.spec.index);
    for record in runs {
        writeln!(out, "\nProcess {}:", record.spec.index)?;
        writeln!(out, "  Requested duration: {}", record.spec.duration)?;
        writeln!(out, "  Start time: {}", format_time(record.metrics.started_at()))?;
        writeln!(out, "  End time: {}", format_time(record.metrics.finished_at()))?;
        writeln!(out, "  Duration: {}", format_duration(record.metrics.duration()))?;
    }

    let mut failures = summary.failures.iter().collect::<Vec<_>>();
    failures.sort_by_key(|failure| failure.spec.index);
    for failure in failures {
        writeln!(out, "\nProcess {} failed:", failure.spec.index)?;
        writeln!(out, "  Requested duration: {}", failure.spec.duration)?;
        writeln!(out, "  Error: {}", failure.error)?;
    }

    writeln!(out, "\nTest aggregated results:")?;
    let Some(aggregate) = &summary.aggregate else {
        writeln!(out, "Start time: {}", format_time(summary.started_at))?;
        writeln!(out, "End time: {}", format_time(summary.finished_at))?;
        return writeln!(out, "No run completed, nothing to aggregate");
    };

    writeln!(out, "Start time: {}", format_time(aggregate.started_at))?;
    writeln!(out, "End time: {}", format_time(aggregate.finished_at))?;
    writeln!(
        out,
        "Test duration: {}",
        format_duration(aggregate.total_duration())
    )?;
    writeln!(
        out,
        "Aggregation of Op rate (sum): {} op/s",
        aggregate.total_op_rate
    )?;
    writeln!(
        out,
        "Average of Latency mean: {:.3} ms",
        aggregate.avg_latency_mean_ms
    )?;
    writeln!(
        out,
        "Average of Latency 99th percentile: {:.3} ms",
        aggregate.avg_latency_99th_ms
    )?;
    match aggregate.stddev_latency_max_ms {
        Some(std) => writeln!(out, "Standard deviation of Latency max: {std:.3} ms"),
        None => writeln!(
            out,
            "Standard deviation of Latency max: undefined (needs at least 2 runs)"
        ),
    }
}
