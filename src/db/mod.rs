//! Database layer
//!
//! This module handles:
//! - Opening connections from a driver identifier and URL
//! - The shared data source repositories draw connections from
//! - Idempotent bootstrap of the `users` table
//! - CRUD access to stored users
//!
//! There is no pool. Each repository call opens its own connection through
//! [`with_connection`] and closes it before returning, whatever the outcome.

pub mod connector;
pub mod data_source;
pub mod schema;
pub mod user_repository;

use futures::future::BoxFuture;
use sqlx::sqlite::SqliteConnection;
use sqlx::Connection;
use tracing::{debug, warn};

pub use connector::{ConnectionFactory, Driver};
pub use data_source::{ConnectionSource, DataSource, SharedDataSource};
pub use schema::{ensure_table, BootstrapOutcome, USERS_TABLE};
pub use user_repository::UserRepository;

use crate::utils::AppResult;

/// Run `op` on a freshly opened connection and close it afterwards.
///
/// The connection is closed on success and on error alike; a failure to close
/// is logged and never replaces the result of `op`. Errors from `op` are logged
/// under `operation`; acquisition failures are already logged by the factory.
pub async fn with_connection<T, F>(
    source: &dyn ConnectionSource,
    operation: &str,
    op: F,
) -> AppResult<T>
where
    T: Send,
    F: for<'c> FnOnce(&'c mut SqliteConnection) -> BoxFuture<'c, AppResult<T>> + Send,
{
    let mut conn = source
        .get_connection()
        .await
        .map_err(|e| {
            debug!(operation, error_type = e.kind(), "No connection for operation");
            e
        })?;

    let result = op(&mut conn).await;

    match conn.close().await {
        Ok(()) => debug!(operation, "Connection closed"),
        Err(e) => warn!(operation, error = %e, "Failed to close connection"),
    }

    result.map_err(|e| e.logged(operation))
}
