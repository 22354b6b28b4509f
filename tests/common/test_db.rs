//! Temporary database setup
//!
//! Every test gets its own SQLite file in a fresh temporary directory. A
//! file is needed rather than `sqlite::memory:` because each repository call
//! opens a new connection, and every in-memory connection is a new database.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use user_repository::{ConnectionSource, DataSource, DatabaseConfig, UserRepository};

use super::MockConnectionSource;

/// Temporary database plus a repository wired to it
pub struct TestDb {
    pub dir: TempDir,
    pub source: Arc<MockConnectionSource>,
    pub repository: UserRepository,
}

impl TestDb {
    /// Create a new temporary database and bootstrap the repository against it
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let source = Arc::new(MockConnectionSource::new(DataSource::new(config_for(&dir))));
        let repository = UserRepository::new(source.clone())
            .await
            .expect("Failed to initialize test repository");

        Self {
            dir,
            source,
            repository,
        }
    }

    /// Path of the SQLite file backing this database
    pub fn path(&self) -> PathBuf {
        self.dir.path().join("users.db")
    }

    pub fn config(&self) -> DatabaseConfig {
        config_for(&self.dir)
    }

    /// A second repository over the same database file
    pub async fn reopen(&self) -> UserRepository {
        let source: Arc<dyn ConnectionSource> = Arc::new(DataSource::new(self.config()));
        UserRepository::new(source)
            .await
            .expect("Failed to reopen test repository")
    }
}

/// Connection parameters for a database file inside `dir`
pub fn config_for(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        driver: "sqlite".to_string(),
        url: format!("sqlite://{}", dir.path().join("users.db").display()),
        name: None,
        password: None,
    }
}
