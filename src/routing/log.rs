//! Route logging at startup.

use crate::routing::registry::{self, Registry};

/// Log every registered route at DEBUG, one line per (method, path).
///
/// A failing walk is logged at ERROR and swallowed; startup never
/// stops over diagnostics.
pub fn log_routes<R: Registry>(registry: &R) {
    let result = registry.walk(|entry| {
        tracing::debug!(
            method = %entry.method,
            route = %registry::normalize(&entry.path),
            "Registered route"
        );
        Ok(())
    });
    if let Err(error) = result {
        tracing::error!(error = %error, "Failed to walk routes");
    }
}
