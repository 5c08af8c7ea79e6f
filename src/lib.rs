//! # sailor
//!
//! Sequential episode-range download orchestrator for torrent backends.
//!
//! Given a show title and an optional season/episode range, sailor expands the
//! range into individual episodes using a metadata provider, then hands them to
//! a download backend one at a time. Each episode is searched on an indexer
//! and the candidate that best matches a user-chosen reference size is picked.
//! The next episode starts only when the backend reports a finished transfer.
//!
//! The pending queue and the canonical show identities are persisted after
//! every change, so a restart resumes where it left off.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sailor::{Config, Providers, RangeOrchestrator};
//! use sailor::types::{MediaType, RangeBounds, RangeRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default().with_env_overrides();
//!     let providers = Providers::from_config(&config.providers)?;
//!     let orchestrator = RangeOrchestrator::new(config, providers).await?;
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let submission = orchestrator
//!         .submit_range(RangeRequest {
//!             title: "the office".to_string(),
//!             year: String::new(),
//!             media_type: MediaType::Show,
//!             bounds: RangeBounds {
//!                 min_season: Some(2),
//!                 max_season: Some(3),
//!                 ..Default::default()
//!             },
//!             reference_size: 734_003_200,
//!         })
//!         .await?;
//!     println!("started {}, queued {}", submission.started_count, submission.queued_count);
//!
//!     // The backend's completion hook calls this after each finished transfer
//!     orchestrator.notify_completion().await;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// SQLite persistence layer
pub mod db;
/// Error types
pub mod error;
/// Range orchestrator (decomposed into focused submodules)
pub mod orchestrator;
/// Metadata, search and download backend adapters
pub mod providers;
/// Durable keyed-blob stores
pub mod store;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use db::Database;
pub use error::{ApiError, DatabaseError, Error, ErrorDetail, ProviderError, Result, ToHttpStatus};
pub use orchestrator::RangeOrchestrator;
pub use providers::{DownloadBackend, MetadataProvider, Providers, SearchProvider};
pub use store::{DurableStore, JsonFileStore, MemoryStore};
pub use types::{
    CandidateSource, CompletionOutcome, DriverState, Durability, EpisodeWorkItem, Event,
    MediaType, RangeBounds, RangeRequest, RangeSubmission, ShowMapping,
};

/// Serve the REST API until a termination signal, then shut down gracefully.
///
/// On a signal the API stops accepting connections, in-flight requests
/// finish, and the orchestrator's `shutdown()` runs.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use sailor::{Config, Providers, RangeOrchestrator, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::default().with_env_overrides();
///     let providers = Providers::from_config(&config.providers)?;
///     let orchestrator = RangeOrchestrator::new(config, providers).await?;
///
///     run_with_shutdown(orchestrator).await?;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(orchestrator: RangeOrchestrator) -> Result<()> {
    let orchestrator = std::sync::Arc::new(orchestrator);
    let token = tokio_util::sync::CancellationToken::new();
    let mut server = orchestrator.spawn_api_server(token.clone());

    let served = tokio::select! {
        _ = wait_for_signal() => {
            token.cancel();
            (&mut server).await
        }
        // Server exited on its own, e.g. the bind address was taken
        result = &mut server => result,
    };

    match served {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "API server exited with error"),
        Err(e) => tracing::error!(error = %e, "API server task panicked"),
    }

    orchestrator.shutdown().await
}
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
