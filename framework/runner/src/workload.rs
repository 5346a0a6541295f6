use std::path::PathBuf;
use std::process::Output;
use stress_harness_summary_model::RunSpec;
use tokio::process::Command;

use crate::error::RunErrorKind;
use crate::executor::Executor;

/// Default image that provides `cassandra-stress`.
pub const DEFAULT_STRESS_IMAGE: &str = "scylladb/cassandra-stress";

/// What a workload process left behind when it exited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadOutput {
    pub success: bool,
    /// Human readable exit status
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl From<Output> for WorkloadOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Launches one instance of the load generating workload and waits for it to exit.
pub trait Workload: Send + Sync {
    fn invoke(
        &self,
        executor: &Executor,
        spec: &RunSpec,
        address: &str,
    ) -> Result<WorkloadOutput, RunErrorKind>;
}

/// Runs `cassandra-stress write` in a throwaway container.
#[derive(Debug, Clone)]
pub struct CassandraStress {
    docker: PathBuf,
    image: String,
    threads: usize,
    session_id: String,
}

impl CassandraStress {
    pub fn new(docker: PathBuf, image: String, threads: usize, session_id: &str) -> Self {
        Self {
            docker,
            image,
            threads,
            session_id: session_id.to_string(),
        }
    }

    /// The command passed to the stress image.
    pub fn stress_command(&self, spec: &RunSpec, address: &str) -> String {
        format!(
            "cassandra-stress write duration={} -rate threads={} -node {}",
            spec.duration, self.threads, address
        )
    }

    fn container_name(&self, spec: &RunSpec) -> String {
        format!("stress-{}-run-{}", self.session_id, spec.index)
    }

    /// Best effort removal of a container whose run was cancelled. Killing the `docker run`
    /// client does not stop the container itself.
    fn remove_container(&self, name: &str) {
        match std::process::Command::new(&self.docker)
            .args(["rm", "--force", name])
            .output()
        {
            Ok(output) if output.status.success() => {
                log::debug!("Removed container {name}");
            }
            Ok(output) => log::warn!(
                "Failed to remove container {name}: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            Err(e) => log::warn!("Failed to remove container {name}: {e}"),
        }
    }
}

impl Workload for CassandraStress {
    fn invoke(
        &self,
        executor: &Executor,
        spec: &RunSpec,
        address: &str,
    ) -> Result<WorkloadOutput, RunErrorKind> {
        let container_name = self.container_name(spec);
        let stress_command = self.stress_command(spec, address);

        log::info!(
            "Running stress test with threads: {}, duration: {} against container {} ...",
            self.threads,
            spec.duration,
            spec.target
        );
        log::debug!(
            "{} run --rm --name {container_name} {} \"{stress_command}\"",
            self.docker.display(),
            self.image
        );

        let output = executor.execute_in_place(
            Command::new(&self.docker)
                .args(["run", "--rm", "--name", &container_name, &self.image])
                .arg(&stress_command)
                .kill_on_drop(true)
                .output(),
        );

        match output {
            Ok(Ok(output)) => Ok(output.into()),
            Ok(Err(source)) => Err(RunErrorKind::Launch {
                program: self.docker.display().to_string(),
                source,
            }),
            Err(cancelled) => {
                self.remove_container(&container_name);
                Err(cancelled.into())
            }
        }
    }
}
