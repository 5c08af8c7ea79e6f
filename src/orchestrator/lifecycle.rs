//! Shutdown coordination.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

use super::RangeOrchestrator;

/// How long shutdown waits for dispatch tasks talking to the backend
const DISPATCH_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

impl RangeOrchestrator {
    /// Gracefully shut down the orchestrator
    ///
    /// 1. Waits (up to 30 seconds) for in-flight dispatch tasks to finish
    /// 2. Records a clean shutdown in the durable store
    ///
    /// The queue and mappings need no final flush: every mutation was
    /// written when it happened.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        match tokio::time::timeout(DISPATCH_DRAIN_TIMEOUT, self.wait_for_dispatches()).await {
            Ok(()) => tracing::info!("All dispatch tasks finished"),
            Err(_) => tracing::warn!(
                in_flight = self.in_flight.load(Ordering::SeqCst),
                "Timeout waiting for dispatch tasks, proceeding with shutdown"
            ),
        }

        if let Err(e) = self.store.mark_clean_shutdown().await {
            tracing::error!(error = %e, "Failed to mark clean shutdown");
            return Err(e);
        }

        tracing::info!(store = self.store.name(), "Graceful shutdown complete");
        Ok(())
    }

    /// Spawn the REST API server in a background task
    ///
    /// The server stops accepting connections once `shutdown` is cancelled.
    pub fn spawn_api_server(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> tokio::task::JoinHandle<Result<()>> {
        let orchestrator = self.clone();
        let config = self.config.clone();

        tokio::spawn(async move {
            crate::api::start_api_server_with_shutdown(orchestrator, config, shutdown).await
        })
    }

    /// Number of dispatch tasks still running
    pub fn dispatches_in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    async fn wait_for_dispatches(&self) {
        loop {
            let active = self.in_flight.load(Ordering::SeqCst);
            if active == 0 {
                return;
            }
            tracing::debug!(active, "Waiting for dispatch tasks to complete");
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
