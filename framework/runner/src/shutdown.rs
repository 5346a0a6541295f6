use tokio::signal;
use stress_harness_core::prelude::ShutdownHandle;

/// Raise the shutdown signal when the user presses Ctrl-C.
pub(crate) fn start_shutdown_listener(runtime: &tokio::runtime::Runtime) -> ShutdownHandle {
    let handle = ShutdownHandle::default();

    let listener_handle = handle.clone();
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("Received shutdown signal, cancelling runs that are still in progress...");
                listener_handle.shutdown();
            }
            Err(e) => {
                log::error!("Failed to listen for Ctrl-C, runs cannot be cancelled: {e:?}");
            }
        }
    });

    handle
}
