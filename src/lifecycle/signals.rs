//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the interrupt (Ctrl+C / SIGINT), once
//! - Translate it into a shutdown trigger
//!
//! # Design Decisions
//! - This task is the only place OS signals enter the system; everything
//!   else observes the [`Shutdown`] coordinator
//! - A failure to install the handler also triggers shutdown: a process
//!   that cannot be interrupted must not keep serving

use crate::lifecycle::shutdown::Shutdown;

/// Spawn the task that trips `shutdown` on the first interrupt.
pub fn listen_for_interrupt(shutdown: Shutdown) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Interrupt received, shutting down"),
            Err(error) => {
                tracing::error!(error = %error, "Failed to install interrupt handler, shutting down")
            }
        }
        shutdown.trigger();
    });
}
