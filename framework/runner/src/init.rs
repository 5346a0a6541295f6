use crate::cli::StressCli;
use clap::Parser;

/// Initialise the CLI and logging for the stress runner.
pub fn init() -> StressCli {
    env_logger::init();

    StressCli::parse()
}
