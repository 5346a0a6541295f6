use std::future::Future;

use stress_harness_core::prelude::{ShutdownHandle, ShutdownSignalError};

/// Owns the async runtime that external processes are driven on.
///
/// Runs call into the executor from their own threads, each blocking until its own future is done.
#[derive(Debug)]
pub struct Executor {
    runtime: tokio::runtime::Runtime,
    shutdown_handle: ShutdownHandle,
}

impl Executor {
    pub fn new(runtime: tokio::runtime::Runtime, shutdown_handle: ShutdownHandle) -> Self {
        Self {
            runtime,
            shutdown_handle,
        }
    }

    pub fn shutdown_handle(&self) -> &ShutdownHandle {
        &self.shutdown_handle
    }

    /// Run async code in place, blocking the calling thread until it completes.
    ///
    /// The future is dropped, and so cancelled, if the shutdown signal is raised before it
    /// completes. Futures that own a child process should set `kill_on_drop` so that the process
    /// does not outlive the cancellation. If the signal was already raised then the future is
    /// never polled.
    ///
    /// Must not be called from within the runtime.
    pub fn execute_in_place<T>(
        &self,
        fut: impl Future<Output = T>,
    ) -> Result<T, ShutdownSignalError> {
        let mut shutdown_listener = self.shutdown_handle.new_listener();
        self.runtime.block_on(async move {
            tokio::select! {
                biased;

                _ = shutdown_listener.wait_for_shutdown() => {
                    Err(ShutdownSignalError::default())
                },
                result = fut => Ok(result),
            }
        })
    }

    /// Submit async code to be run in the background.
    ///
    /// The future is not cancelled by the shutdown signal and is dropped with the runtime.
    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.runtime.spawn(fut);
    }
}
