//! OS signal handling.
//!
//! # Responsibilities
//! - Translate Ctrl-C / SIGTERM into a cancellation of the running harness
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Cancelling aborts the in-flight request and any pending retries

use std::sync::Arc;

use crate::lifecycle::Cancellation;

/// Spawn a task that cancels `cancellation` on the first termination signal.
pub fn cancel_on_signal(cancellation: Arc<Cancellation>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::warn!("Termination signal received, cancelling in-flight checks");
        cancellation.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Cannot listen for SIGTERM, watching Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
