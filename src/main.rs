//! User Repository - list the users stored in the configured database
//!
//! Loads configuration, initializes logging, bootstraps the `users` table if
//! needed and prints every stored user, one per line.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, registry::Registry, EnvFilter, Layer};

use user_repository::config::{LogFormat, LogTarget, LoggingConfig};
use user_repository::{AppConfig, ConnectionSource, DataSource, UserRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        println!("user-repository {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Load configuration first (before logging, so we know log format)
    let config = AppConfig::load().context("Failed to load configuration")?;

    // The guard must be kept alive for the duration of the program
    // to ensure log messages are flushed to files
    let _log_guard = init_logging(&config.logging);

    info!("Configuration loaded successfully");

    ensure_data_directory(&config)?;

    let data_source = DataSource::init_instance(config.database.clone())
        .context("Failed to initialize data source")?;
    let source: Arc<dyn ConnectionSource> = data_source;
    let repository = UserRepository::new(source)
        .await
        .context("Failed to initialize user repository")?;

    let users = repository.find_all_users().await;
    info!(count = users.len(), "Loaded users");
    for user in &users {
        println!("{}", user);
    }

    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize tracing from the logging configuration
fn init_logging(
    log_config: &LoggingConfig,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_config.level));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if matches!(log_config.target, LogTarget::Console | LogTarget::Both) {
        layers.push(format_layer(&log_config.format, None));
    }

    if matches!(log_config.target, LogTarget::File | LogTarget::Both) {
        if let Err(e) = std::fs::create_dir_all(&log_config.log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_config.log_dir, e
            );
        }

        let file_appender = if log_config.daily_rotation {
            tracing_appender::rolling::daily(&log_config.log_dir, &log_config.log_prefix)
        } else {
            tracing_appender::rolling::never(&log_config.log_dir, &log_config.log_prefix)
        };
        let (writer, worker_guard) = tracing_appender::non_blocking(file_appender);
        layers.push(format_layer(&log_config.format, Some(writer)));
        guard = Some(worker_guard);
    }

    tracing_subscriber::registry()
        .with(layers.with_filter(env_filter))
        .init();

    guard
}

/// Build one formatting layer, writing to stdout or to the given file writer
fn format_layer(
    format: &LogFormat,
    writer: Option<tracing_appender::non_blocking::NonBlocking>,
) -> BoxedLayer {
    match (format, writer) {
        (LogFormat::Json, None) => fmt::layer().json().with_target(true).boxed(),
        (LogFormat::Json, Some(w)) => fmt::layer().json().with_target(true).with_writer(w).boxed(),
        (LogFormat::Compact, None) => fmt::layer().compact().with_target(false).boxed(),
        (LogFormat::Compact, Some(w)) => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(w)
            .boxed(),
        (LogFormat::Pretty, None) => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .boxed(),
        (LogFormat::Pretty, Some(w)) => fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(w)
            .boxed(),
    }
}

/// Create the parent directory of a file-backed SQLite database
fn ensure_data_directory(config: &AppConfig) -> Result<()> {
    if let Some(path) = sqlite_file_path(&config.database.url) {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).context("Failed to create data directory")?;
                info!("Created data directory: {:?}", parent);
            }
        }
    }
    Ok(())
}

/// File path of a `sqlite:` URL, or `None` for in-memory databases
fn sqlite_file_path(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let path = rest.split('?').next().unwrap_or(rest);
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(path)
    }
}

fn print_help() {
    println!(
        r#"user-repository {}

USAGE:
    user-repository [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -V, --version           Print version information

ENVIRONMENT:
    USERDB_CONFIG       Path to configuration file (default: config.yaml)
    DATABASE_DRIVER     Driver identifier (default: sqlite)
    DATABASE_URL        Connection string (default: sqlite://./data/users.db)
    DATABASE_USER       Default user name
    DATABASE_PASSWORD   Default password
    RUST_LOG            Log filter (overrides logging.level)

CONFIGURATION:
    The application looks for configuration files in the following order:
    1. Path specified by USERDB_CONFIG environment variable
    2. ./config.yaml
    3. ./config/config.yaml
    4. /etc/user-repository/config.yaml"#,
        env!("CARGO_PKG_VERSION")
    );
}
