//! Data source
//!
//! [`DataSource`] holds immutable connection parameters and hands out a fresh
//! connection on every request. Repositories receive it as an explicit
//! dependency through the [`ConnectionSource`] trait.
//!
//! For callers that want a single process-wide instance, [`DataSource::instance`]
//! builds one lazily from [`AppConfig`]. Initialization runs at most once: a
//! concurrent first call blocks until the winner has finished and then sees
//! the same fully-built value.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::OnceCell;
use sqlx::sqlite::SqliteConnection;
use tracing::info;

use crate::config::{AppConfig, ConfigSource, DatabaseConfig};
use crate::db::connector::ConnectionFactory;
use crate::utils::{AppError, AppResult};

fn not_implemented(capability: &str) -> AppError {
    AppError::NotImplemented(format!("data source {} is not supported", capability))
}

/// Anything that can hand out live connections
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Open a connection with the stored credentials
    async fn get_connection(&self) -> AppResult<SqliteConnection>;

    /// Open a connection with caller-supplied credentials
    async fn get_connection_as(&self, user: &str, password: &str) -> AppResult<SqliteConnection>;

    fn log_writer(&self) -> AppResult<Box<dyn Write + Send>> {
        Err(not_implemented("log writer"))
    }

    fn set_log_writer(&self, _writer: Box<dyn Write + Send>) -> AppResult<()> {
        Err(not_implemented("log writer"))
    }

    fn login_timeout(&self) -> AppResult<Duration> {
        Err(not_implemented("login timeout"))
    }

    fn set_login_timeout(&self, _timeout: Duration) -> AppResult<()> {
        Err(not_implemented("login timeout"))
    }

    fn is_wrapper_for(&self, _type_name: &str) -> AppResult<bool> {
        Err(not_implemented("wrapper introspection"))
    }
}

/// Connection parameters plus the factory that turns them into connections
#[derive(Debug)]
pub struct DataSource {
    config: DatabaseConfig,
    factory: ConnectionFactory,
}

static INSTANCE: SharedDataSource = SharedDataSource::new();

impl DataSource {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            factory: ConnectionFactory::new(),
        }
    }

    /// Build a data source from any key/value configuration source
    pub fn from_source(source: &dyn ConfigSource) -> AppResult<Self> {
        Ok(Self::new(DatabaseConfig::from_source(source)?))
    }

    /// Process-wide instance, loaded from [`AppConfig::load`] on first use
    pub fn instance() -> AppResult<Arc<DataSource>> {
        INSTANCE.get_or_init_with(|| {
            let config = AppConfig::load()?;
            Ok(config.database)
        })
    }

    /// Process-wide instance built from already-loaded parameters.
    ///
    /// Has no effect if the instance exists; the existing one is returned.
    pub fn init_instance(config: DatabaseConfig) -> AppResult<Arc<DataSource>> {
        INSTANCE.get_or_init_with(|| Ok(config))
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }
}

#[async_trait]
impl ConnectionSource for DataSource {
    async fn get_connection(&self) -> AppResult<SqliteConnection> {
        match self.config.name.as_deref() {
            Some(user) => {
                let password = self.config.password.as_deref().unwrap_or_default();
                self.factory
                    .open_with_credentials(&self.config.driver, &self.config.url, user, password)
                    .await
            }
            None => self.factory.open(&self.config.driver, &self.config.url).await,
        }
    }

    async fn get_connection_as(&self, user: &str, password: &str) -> AppResult<SqliteConnection> {
        self.factory
            .open_with_credentials(&self.config.driver, &self.config.url, user, password)
            .await
    }
}

/// Lazily-built, shared [`DataSource`]
#[derive(Debug, Default)]
pub struct SharedDataSource {
    cell: OnceCell<Arc<DataSource>>,
}

impl SharedDataSource {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the shared instance, running `load` only if none exists yet.
    ///
    /// A failed load leaves the holder empty so a later call can retry.
    pub fn get_or_init_with<F>(&self, load: F) -> AppResult<Arc<DataSource>>
    where
        F: FnOnce() -> AppResult<DatabaseConfig>,
    {
        self.cell
            .get_or_try_init(|| -> AppResult<Arc<DataSource>> {
                let config = load()?;
                info!(driver = %config.driver, "Data source initialized");
                Ok(Arc::new(DataSource::new(config)))
            })
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<DataSource>> {
        self.cell.get().cloned()
    }
}
