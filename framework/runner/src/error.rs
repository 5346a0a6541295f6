use stress_harness_core::prelude::ShutdownSignalError;
use stress_harness_summary_model::RunSpec;

use crate::parser::ParseError;

/// Why a single run did not produce metrics.
#[derive(Debug, thiserror::Error)]
pub enum RunErrorKind {
    #[error("Failed to get the IP address of the container named '{target}' (make sure such container is up and running): {reason}")]
    TargetResolution { target: String, reason: String },
    #[error("Failed to launch the workload with {program}: {source}")]
    Launch {
        program: String,
        source: std::io::Error,
    },
    #[error("Workload exited with {status}: {stderr}")]
    Execution { status: String, stderr: String },
    #[error("Failed to parse workload output: {0}")]
    Parse(#[from] ParseError),
    #[error("Cancelled by shutdown signal")]
    Cancelled,
    #[error("Run aborted: {reason}")]
    Aborted { reason: String },
}

impl From<ShutdownSignalError> for RunErrorKind {
    fn from(_: ShutdownSignalError) -> Self {
        RunErrorKind::Cancelled
    }
}

/// A failed run, with the run it belongs to so that the message stands on its own.
#[derive(Debug, thiserror::Error)]
#[error("{spec} failed: {kind}")]
pub struct RunError {
    pub spec: RunSpec,
    pub kind: RunErrorKind,
}

impl RunError {
    pub fn new(spec: RunSpec, kind: RunErrorKind) -> Self {
        Self { spec, kind }
    }
}
