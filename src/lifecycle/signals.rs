//! OS signal handling.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Trigger `shutdown` on the first Ctrl-C.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Interrupt received, shutting down");
                shutdown.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Unable to listen for Ctrl-C"),
        }
    })
}
