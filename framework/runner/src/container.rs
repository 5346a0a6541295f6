use std::path::PathBuf;
use tokio::process::Command;

use crate::error::RunErrorKind;
use crate::executor::Executor;

/// Resolves the name of the service under test to the address the workload should connect to.
pub trait TargetResolver: Send + Sync {
    /// Fails with [RunErrorKind::TargetResolution] rather than returning an empty address.
    fn resolve(&self, executor: &Executor, target: &str) -> Result<String, RunErrorKind>;
}

/// Looks up the IP address of a running container with `docker inspect`.
#[derive(Debug, Clone)]
pub struct DockerResolver {
    docker: PathBuf,
}

impl DockerResolver {
    pub fn new(docker: PathBuf) -> Self {
        Self { docker }
    }
}

impl TargetResolver for DockerResolver {
    fn resolve(&self, executor: &Executor, target: &str) -> Result<String, RunErrorKind> {
        let resolution_error = |reason: String| RunErrorKind::TargetResolution {
            target: target.to_string(),
            reason,
        };

        let output = executor.execute_in_place(
            Command::new(&self.docker)
                .args(["inspect", "--format", "{{.NetworkSettings.IPAddress}}", target])
                .kill_on_drop(true)
                .output(),
        )?;
        let output = output.map_err(|e| {
            resolution_error(format!("could not run {}: {e}", self.docker.display()))
        })?;

        if !output.status.success() {
            return Err(resolution_error(format!(
                "docker inspect exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let address = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if address.is_empty() {
            return Err(resolution_error(
                "docker inspect did not report an IP address".to_string(),
            ));
        }

        log::debug!("Container '{target}' has address {address}");

        Ok(address)
    }
}
