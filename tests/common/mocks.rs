//! Mock connection sources for testing
//!
//! Wrap a real [`DataSource`] to count acquisitions or to simulate a database
//! that stops accepting connections.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnection;

use user_repository::{AppError, AppResult, ConnectionSource, DataSource};

/// Connection source that records how often it was asked for a connection
/// and can be switched into a failing mode
pub struct MockConnectionSource {
    inner: DataSource,
    acquired: AtomicUsize,
    unavailable: AtomicBool,
}

impl MockConnectionSource {
    pub fn new(inner: DataSource) -> Self {
        Self {
            inner,
            acquired: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Number of successful connection acquisitions so far
    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    /// Simulate the database refusing every new connection
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::connection_msg("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionSource for MockConnectionSource {
    async fn get_connection(&self) -> AppResult<SqliteConnection> {
        self.check_available()?;
        let conn = self.inner.get_connection().await?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(conn)
    }

    async fn get_connection_as(&self, user: &str, password: &str) -> AppResult<SqliteConnection> {
        self.check_available()?;
        let conn = self.inner.get_connection_as(user, password).await?;
        self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(conn)
    }
}
