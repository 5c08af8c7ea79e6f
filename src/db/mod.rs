//! Database layer for sailor
//!
//! SQLite persistence for the durable queue and show-mapping snapshots.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`blobs`] - Keyed snapshot storage ([`crate::store::DurableStore`] implementation)
//! - [`state`] - Runtime state (clean shutdown tracking)

use sqlx::sqlite::SqlitePool;

mod blobs;
mod migrations;
mod state;

/// Database handle for sailor
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
