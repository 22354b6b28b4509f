//! Schema bootstrap
//!
//! The only schema management this crate does: make sure the `users` table
//! exists, creating it when it does not. Running it against an existing table
//! issues no DDL.

use sqlx::sqlite::SqliteConnection;
use tracing::{debug, info};

use crate::db::{with_connection, ConnectionSource};
use crate::utils::{AppError, AppResult};

pub const USERS_TABLE: &str = "users";

const TABLE_EXISTS_SQL: &str = "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?";

const CREATE_USERS_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGINT NOT NULL UNIQUE PRIMARY KEY,
        firstname TEXT NOT NULL,
        lastname TEXT NOT NULL,
        age INTEGER NOT NULL
    )
"#;

/// What [`ensure_table`] had to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    AlreadyPresent,
    Created,
}

/// Catalog lookup for a table by name
pub async fn table_exists(conn: &mut SqliteConnection, table: &str) -> AppResult<bool> {
    let found = sqlx::query_scalar::<_, String>(TABLE_EXISTS_SQL)
        .bind(table)
        .fetch_optional(conn)
        .await?;

    Ok(found.is_some())
}

/// Create the `users` table unless it already exists.
///
/// Statement failures and a table that is still missing after creation are
/// reported as [`AppError::Bootstrap`]. Failing to connect stays an
/// [`AppError::Connection`].
pub async fn ensure_table(source: &dyn ConnectionSource) -> AppResult<BootstrapOutcome> {
    with_connection(source, "ensure users table", |conn| {
        Box::pin(async move {
            let bootstrap = |e: AppError| AppError::Bootstrap(format!("{}: {}", USERS_TABLE, e));

            if table_exists(&mut *conn, USERS_TABLE).await.map_err(bootstrap)? {
                debug!(table = USERS_TABLE, "Table already present");
                return Ok(BootstrapOutcome::AlreadyPresent);
            }

            sqlx::query(CREATE_USERS_TABLE_SQL)
                .execute(&mut *conn)
                .await
                .map_err(|e| bootstrap(e.into()))?;

            if !table_exists(&mut *conn, USERS_TABLE).await.map_err(bootstrap)? {
                return Err(AppError::Bootstrap(format!(
                    "table {} still missing after create",
                    USERS_TABLE
                )));
            }

            info!(table = USERS_TABLE, "Created table");
            Ok(BootstrapOutcome::Created)
        })
    })
    .await
}
