//! Error types and handling
//!
//! Every fallible operation in the crate returns [`AppResult`]. Variants map
//! one-to-one onto the failure classes a caller has to distinguish: cannot
//! connect, cannot bootstrap the schema, no matching row, a mutation that
//! touched nothing, or a data-source capability that is declared but inert.

use thiserror::Error;
use tracing::{error, warn};

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// A connection could not be obtained (unknown driver, bad URL, I/O, auth)
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// Schema setup failed; the repository cannot be constructed
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// A keyed lookup matched zero rows
    #[error("Not found: {0}")]
    NotFound(String),

    /// A mutating statement affected zero rows where at least one was expected
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Declared data-source capability that is intentionally unsupported
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Unique key violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Entity rejected before any statement ran
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Statement-level engine failure
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Build a connection error that keeps the driver error as its source
    pub fn connection(message: impl Into<String>, source: sqlx::Error) -> Self {
        AppError::Connection {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Build a connection error with no underlying driver error
    pub fn connection_msg(message: impl Into<String>) -> Self {
        AppError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Stable identifier for the error class, used as a log field
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Connection { .. } => "connection_error",
            AppError::Bootstrap(_) => "bootstrap_error",
            AppError::NotFound(_) => "not_found",
            AppError::OperationFailed(_) => "operation_failed",
            AppError::NotImplemented(_) => "not_implemented",
            AppError::Conflict(_) => "conflict",
            AppError::ValidationError(_) => "validation_error",
            AppError::Database(_) => "database_error",
            AppError::Config(_) => "config_error",
        }
    }

    /// Log the error against the operation that produced it and hand it back.
    ///
    /// `operation` names the SQL intent ("find user by id"), never bound values.
    pub fn logged(self, operation: &str) -> Self {
        let expected = matches!(
            self,
            AppError::NotFound(_)
                | AppError::OperationFailed(_)
                | AppError::Conflict(_)
                | AppError::ValidationError(_)
        );

        if expected {
            warn!(operation, error_type = self.kind(), error = %self, "Operation rejected");
        } else {
            error!(operation, error_type = self.kind(), error = %self, "Operation failed");
        }
        self
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.message().contains("UNIQUE constraint failed") {
                    AppError::Conflict("Resource already exists".to_string())
                } else {
                    AppError::Database(db_err.to_string())
                }
            }
            _ => AppError::Database(err.to_string()),
        }
    }
}

/// Only field names and rule codes are kept; rejected values never reach the message
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let mut failures: Vec<String> = err
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors
                    .iter()
                    .map(move |e| format!("{}: {}", field, e.code))
            })
            .collect();
        failures.sort();

        AppError::ValidationError(failures.join(", "))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config(format!("{:#}", err))
    }
}

/// Result type alias used across the crate
pub type AppResult<T> = Result<T, AppError>;
