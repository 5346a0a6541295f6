use clap::Parser;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use stress_harness_summariser::report::DEFAULT_RESULTS_DIR;
use stress_harness_summary_model::RunDuration;

use crate::workload::DEFAULT_STRESS_IMAGE;

#[derive(Parser, Debug)]
#[command(about = "Concurrent stress test runner and analyzer", long_about = None)]
pub struct StressCli {
    /// List of durations, one concurrent stress test is run per duration (format: 1s,5m,10s)
    ///
    /// Every duration is a number followed by `s`, `m` or `h`. If any duration is malformed then
    /// no stress test is started.
    #[clap(short, long, required = true, value_delimiter = ',')]
    pub duration: Vec<RunDuration>,

    /// Name of the ScyllaDB container to put under load
    #[clap(short = 'n', long, default_value = "some-scylla")]
    pub container_name: String,

    /// The number of threads each stress test uses to generate load
    #[clap(long, default_value = "10")]
    pub threads: NonZeroUsize,

    /// The image that provides `cassandra-stress`
    #[clap(long, default_value = DEFAULT_STRESS_IMAGE)]
    pub image: String,

    /// Directory that the report for this session is written to
    #[clap(long, default_value = DEFAULT_RESULTS_DIR)]
    pub results_dir: PathBuf,

    /// Append a JSON summary of the session to this file, one session per line
    #[clap(long, env = "RUN_SUMMARY_PATH")]
    pub summary_path: Option<PathBuf>,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by anyone and is just adding noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,
}
