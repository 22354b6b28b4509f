//! Connection factory
//!
//! Opens one raw SQLite connection per call. Failures are classified as
//! [`AppError::Connection`] and always returned to the caller; nothing here
//! hands back an empty result on failure.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::ConnectOptions;
use tracing::{error, info};

use crate::utils::{AppError, AppResult};

/// Database driver resolved from a configured identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

impl Driver {
    /// Resolve a driver identifier. Matching is case-insensitive.
    pub fn from_identifier(identifier: &str) -> AppResult<Self> {
        match identifier.trim().to_lowercase().as_str() {
            "sqlite" | "sqlite3" | "org.sqlite.jdbc" => Ok(Driver::Sqlite),
            _ => Err(AppError::connection_msg(format!(
                "driver not found: {}",
                identifier
            ))),
        }
    }

    /// Whether a connection URL belongs to this driver
    pub fn accepts_url(&self, url: &str) -> bool {
        match self {
            Driver::Sqlite => url.starts_with("sqlite:"),
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Driver::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Opens connections for a driver identifier and URL
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectionFactory;

impl ConnectionFactory {
    pub fn new() -> Self {
        Self
    }

    /// Open a connection without credentials
    pub async fn open(&self, driver: &str, url: &str) -> AppResult<SqliteConnection> {
        self.connect(driver, url, false).await
    }

    /// Open a connection with explicit credentials.
    ///
    /// SQLite has no authentication, so once the user name is checked the
    /// credentials go no further than this call.
    pub async fn open_with_credentials(
        &self,
        driver: &str,
        url: &str,
        user: &str,
        _password: &str,
    ) -> AppResult<SqliteConnection> {
        if user.trim().is_empty() {
            let err = AppError::connection_msg("user name must not be blank");
            error!(driver, url = %redact_url(url), error = %err, "Failed to connect to database");
            return Err(err);
        }

        self.connect(driver, url, true).await
    }

    async fn connect(
        &self,
        driver: &str,
        url: &str,
        with_credentials: bool,
    ) -> AppResult<SqliteConnection> {
        let safe_url = redact_url(url);

        match try_connect(driver, url, &safe_url).await {
            Ok(conn) => {
                info!(driver, url = %safe_url, with_credentials, "Connected to the database");
                Ok(conn)
            }
            Err(e) => {
                error!(
                    driver,
                    url = %safe_url,
                    with_credentials,
                    error = %e,
                    "Failed to connect to database"
                );
                Err(e)
            }
        }
    }
}

async fn try_connect(driver: &str, url: &str, safe_url: &str) -> AppResult<SqliteConnection> {
    let driver = Driver::from_identifier(driver)?;
    if !driver.accepts_url(url) {
        return Err(AppError::connection_msg(format!(
            "url {} is not a {} connection string",
            safe_url, driver
        )));
    }

    let options = SqliteConnectOptions::from_str(url)
        .map_err(|e| AppError::connection(format!("invalid connection url {}", safe_url), e))?
        .create_if_missing(true);

    options
        .connect()
        .await
        .map_err(|e| AppError::connection(format!("failed to open {}", safe_url), e))
}

/// Strip any `user:password@` segment from a URL before it reaches a log line
pub fn redact_url(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let rest = &url[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());

    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}://***@{}", &url[..scheme_end], &rest[at + 1..]),
        None => url.to_string(),
    }
}
