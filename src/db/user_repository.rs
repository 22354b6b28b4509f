//! User repository
//!
//! CRUD over the `users` table. Every method opens its own connection, runs a
//! single parameterized statement and closes the connection again.
//!
//! `create_user` stores the caller's `id` as the primary key and returns that
//! same `id`; the schema never generates keys.

use std::sync::Arc;

use sqlx::sqlite::SqliteConnection;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::db::{ensure_table, with_connection, ConnectionSource};
use crate::models::User;
use crate::utils::{AppError, AppResult};

const INSERT_USER_SQL: &str =
    "INSERT INTO users (id, firstname, lastname, age) VALUES (?, ?, ?, ?)";

const SELECT_USER_BY_ID_SQL: &str =
    "SELECT id, firstname, lastname, age FROM users WHERE id = ?";

// Several users may share a first name; the lowest id wins.
const SELECT_USER_BY_NAME_SQL: &str =
    "SELECT id, firstname, lastname, age FROM users WHERE firstname = ? ORDER BY id LIMIT 1";

const SELECT_ALL_USERS_SQL: &str = "SELECT id, firstname, lastname, age FROM users ORDER BY id";

const UPDATE_USER_SQL: &str =
    "UPDATE users SET firstname = ?, lastname = ?, age = ? WHERE id = ?";

const DELETE_USER_SQL: &str = "DELETE FROM users WHERE id = ?";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    firstname: String,
    lastname: String,
    age: i32,
}

/// Repository for user operations
pub struct UserRepository {
    source: Arc<dyn ConnectionSource>,
}

impl UserRepository {
    /// Build the repository, creating the `users` table if it is missing
    pub async fn new(source: Arc<dyn ConnectionSource>) -> AppResult<Self> {
        ensure_table(source.as_ref()).await?;
        Ok(Self { source })
    }

    /// Insert a user and return its id
    pub async fn create_user(&self, user: &User) -> AppResult<i64> {
        const OPERATION: &str = "create user";
        user.validate()
            .map_err(|e| AppError::from(e).logged(OPERATION))?;

        let row = user.clone();
        let affected = with_connection(self.source.as_ref(), OPERATION, move |conn| {
            Box::pin(async move {
                let result = sqlx::query(INSERT_USER_SQL)
                    .bind(row.id)
                    .bind(&row.first_name)
                    .bind(&row.last_name)
                    .bind(row.age)
                    .execute(&mut *conn)
                    .await?;
                Ok(result.rows_affected())
            })
        })
        .await?;

        if affected == 0 {
            return Err(AppError::OperationFailed("unable to create user".to_string()).logged(OPERATION));
        }

        info!(user_id = user.id, "Created user");
        Ok(user.id)
    }

    /// Get a user by id
    pub async fn find_user_by_id(&self, id: i64) -> AppResult<User> {
        let row = with_connection(self.source.as_ref(), "find user by id", move |conn| {
            Box::pin(async move { fetch_user_by_id(conn, id).await })
        })
        .await?;

        row.ok_or_else(|| {
            AppError::NotFound(format!("user with id {}", id)).logged("find user by id")
        })
    }

    /// Get the first user (lowest id) with the given first name
    pub async fn find_user_by_name(&self, first_name: &str) -> AppResult<User> {
        let name = first_name.to_string();
        let row = with_connection(self.source.as_ref(), "find user by name", move |conn| {
            Box::pin(async move {
                let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_NAME_SQL)
                    .bind(&name)
                    .fetch_optional(&mut *conn)
                    .await?;
                Ok(row.map(row_to_user))
            })
        })
        .await?;

        row.ok_or_else(|| {
            AppError::NotFound("no user with the given first name".to_string())
                .logged("find user by name")
        })
    }

    /// List every stored user, ordered by id.
    ///
    /// Best effort: any failure is logged and yields an empty list.
    pub async fn find_all_users(&self) -> Vec<User> {
        let result = with_connection(self.source.as_ref(), "list users", |conn| {
            Box::pin(async move {
                let rows = sqlx::query_as::<_, UserRow>(SELECT_ALL_USERS_SQL)
                    .fetch_all(&mut *conn)
                    .await?;
                Ok(rows.into_iter().map(row_to_user).collect::<Vec<_>>())
            })
        })
        .await;

        match result {
            Ok(users) => {
                debug!(count = users.len(), "Listed users");
                users
            }
            Err(e) => {
                warn!(error_type = e.kind(), "Listing users failed, returning no users");
                Vec::new()
            }
        }
    }

    /// Replace every non-key field of the stored user with the same id
    pub async fn update_user(&self, user: &User) -> AppResult<User> {
        const OPERATION: &str = "update user";
        user.validate()
            .map_err(|e| AppError::from(e).logged(OPERATION))?;

        let row = user.clone();
        let affected = with_connection(self.source.as_ref(), OPERATION, move |conn| {
            Box::pin(async move {
                let result = sqlx::query(UPDATE_USER_SQL)
                    .bind(&row.first_name)
                    .bind(&row.last_name)
                    .bind(row.age)
                    .bind(row.id)
                    .execute(&mut *conn)
                    .await?;
                Ok(result.rows_affected())
            })
        })
        .await?;

        if affected == 0 {
            return Err(AppError::OperationFailed(format!(
                "unable to update user with id {}",
                user.id
            ))
            .logged(OPERATION));
        }

        info!(user_id = user.id, "Updated user");
        self.find_user_by_id(user.id).await
    }

    /// Delete a user by id
    pub async fn delete_user(&self, id: i64) -> AppResult<()> {
        let affected = with_connection(self.source.as_ref(), "delete user", move |conn| {
            Box::pin(async move {
                let result = sqlx::query(DELETE_USER_SQL)
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                Ok(result.rows_affected())
            })
        })
        .await?;

        if affected == 0 {
            return Err(AppError::NotFound(format!("user with id {}", id)).logged("delete user"));
        }

        info!(user_id = id, "Deleted user");
        Ok(())
    }
}

async fn fetch_user_by_id(conn: &mut SqliteConnection, id: i64) -> AppResult<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(SELECT_USER_BY_ID_SQL)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(row.map(row_to_user))
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: row.id,
        first_name: row.firstname,
        last_name: row.lastname,
        age: row.age,
    }
}
