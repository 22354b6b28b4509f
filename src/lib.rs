//! User Repository Library
//!
//! A small data-access layer over SQLite: a connection factory, a lazily
//! shared data source and a repository with CRUD operations for users.

pub mod config;
pub mod db;
pub mod models;
pub mod utils;

pub use config::{AppConfig, ConfigSource, DatabaseConfig};
pub use db::{ConnectionFactory, ConnectionSource, DataSource, UserRepository};
pub use models::User;
pub use utils::{AppError, AppResult};
