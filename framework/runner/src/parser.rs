use regex::Regex;
use std::sync::LazyLock;
use stress_harness_summary_model::WorkloadMetrics;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("missing '{metric}' in workload output")]
    MissingMetric { metric: &'static str },
    #[error("invalid value '{value}' for '{metric}'")]
    InvalidNumber { metric: &'static str, value: String },
}

/// Extracts the workload metrics from the raw output of one run.
pub trait MetricsParser: Send + Sync {
    fn parse(&self, output: &str) -> Result<WorkloadMetrics, ParseError>;
}

const OP_RATE: &str = "Op rate";
const LATENCY_MEAN: &str = "Latency mean";
const LATENCY_99TH: &str = "Latency 99th percentile";
const LATENCY_MAX: &str = "Latency max";

// Matches the results block that cassandra-stress prints when it finishes, for example
// `Op rate                   :   12,345 op/s  [WRITE: 12,345 op/s]`.
static OP_RATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Op rate\s*:\s*([0-9][0-9,]*)\s*op/s").expect("Invalid regex pattern")
});
static LATENCY_MEAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| latency_pattern(LATENCY_MEAN));
static LATENCY_99TH_PATTERN: LazyLock<Regex> = LazyLock::new(|| latency_pattern(LATENCY_99TH));
static LATENCY_MAX_PATTERN: LazyLock<Regex> = LazyLock::new(|| latency_pattern(LATENCY_MAX));

fn latency_pattern(label: &str) -> Regex {
    Regex::new(&format!(
        r"{}\s*:\s*([0-9][0-9,]*(?:\.[0-9]+)?)\s*ms",
        regex::escape(label)
    ))
    .expect("Invalid regex pattern")
}

/// Parser for the summary printed by `cassandra-stress`.
///
/// Looks for the first `<Label> : <number> <unit>` line for each metric. Thousands separators are
/// accepted in every value.
#[derive(Debug, Default, Clone, Copy)]
pub struct CassandraStressParser;

impl MetricsParser for CassandraStressParser {
    fn parse(&self, output: &str) -> Result<WorkloadMetrics, ParseError> {
        let op_rate = capture(&OP_RATE_PATTERN, OP_RATE, output)?;
        let op_rate = strip_separators(op_rate)
            .parse::<u64>()
            .map_err(|_| ParseError::InvalidNumber {
                metric: OP_RATE,
                value: op_rate.to_string(),
            })?;

        Ok(WorkloadMetrics {
            op_rate,
            latency_mean_ms: capture_ms(&LATENCY_MEAN_PATTERN, LATENCY_MEAN, output)?,
            latency_99th_ms: capture_ms(&LATENCY_99TH_PATTERN, LATENCY_99TH, output)?,
            latency_max_ms: capture_ms(&LATENCY_MAX_PATTERN, LATENCY_MAX, output)?,
        })
    }
}

fn capture<'a>(
    pattern: &Regex,
    metric: &'static str,
    output: &'a str,
) -> Result<&'a str, ParseError> {
    pattern
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|value| value.as_str())
        .ok_or(ParseError::MissingMetric { metric })
}

fn capture_ms(pattern: &Regex, metric: &'static str, output: &str) -> Result<f64, ParseError> {
    let value = capture(pattern, metric, output)?;
    strip_separators(value)
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber {
            metric,
            value: value.to_string(),
        })
}

fn strip_separators(value: &str) -> String {
    value.replace(',', "")
}
