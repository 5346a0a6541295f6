mod cli;
mod container;
mod docker_binary;
mod error;
mod executor;
mod init;
mod orchestrator;
mod parser;
mod progress;
mod run;
mod run_executor;
mod shutdown;
mod workload;

pub use init::init;
pub use run::run;

pub mod prelude {
    pub use crate::cli::StressCli;
    pub use crate::container::{DockerResolver, TargetResolver};
    pub use crate::docker_binary::{docker_path, STRESS_DOCKER_PATH_ENV};
    pub use crate::error::{RunError, RunErrorKind};
    pub use crate::executor::Executor;
    pub use crate::orchestrator::{Orchestrator, RunOutcome, SessionState};
    pub use crate::parser::{CassandraStressParser, MetricsParser, ParseError};
    pub use crate::progress::{BarProgress, LogProgress, ProgressObserver};
    pub use crate::run_executor::RunExecutor;
    pub use crate::workload::{CassandraStress, Workload, WorkloadOutput, DEFAULT_STRESS_IMAGE};
}
