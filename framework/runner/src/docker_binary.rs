use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;

/// Environment variable to override the path to the Docker binary used to inspect containers and
/// launch workloads.
pub const STRESS_DOCKER_PATH_ENV: &str = "STRESS_DOCKER_PATH";

/// Get the path to the Docker binary.
///
/// If the [`STRESS_DOCKER_PATH_ENV`] environment variable is set, its value is used as the path to
/// the Docker binary. If it is not set, `docker` is looked up in the user's `PATH`.
pub fn docker_path() -> anyhow::Result<PathBuf> {
    resolve_docker_path(
        env::var(STRESS_DOCKER_PATH_ENV).ok().as_deref(),
        env::var_os("PATH"),
    )
}

fn resolve_docker_path(
    override_path: Option<&str>,
    search_path: Option<OsString>,
) -> anyhow::Result<PathBuf> {
    match override_path {
        Some("") => {
            bail!("'{STRESS_DOCKER_PATH_ENV}' set to empty string");
        }
        Some("docker") | None => {
            log::debug!("'{STRESS_DOCKER_PATH_ENV}' is not a path so looking in user's 'PATH'");
            let cwd = env::current_dir().context("Failed to get current directory")?;
            which::which_in("docker", search_path, cwd).with_context(|| {
                format!(
                    "Docker binary not found in PATH. Please install Docker or set '{STRESS_DOCKER_PATH_ENV}' to the correct path."
                )
            })
        }
        Some(path) => {
            let docker_path = PathBuf::from(path);
            if !docker_path.exists() {
                bail!(
                    "Path to Docker binary overwritten with '{STRESS_DOCKER_PATH_ENV}={path}' but that path doesn't exist",
                    path = docker_path.display()
                );
            }
            Ok(docker_path)
        }
    }
}
