//! Structured logging init, following `infrastructure/logging/logger.rs`'s
//! `LoggerImpl`: an `EnvFilter` seeded from the configured level, a JSON or
//! pretty `fmt` layer, and a `WorkerGuard` kept alive for the process
//! lifetime so buffered log lines aren't dropped on exit.

use anyhow::Result;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::LoggingConfig;

pub struct LoggerGuard {
    _guard: WorkerGuard,
}

/// Initialize the global tracing subscriber from `config`. Call once, at
/// startup, before spawning the reconcilers or the HTTP server.
pub fn init(config: &LoggingConfig) -> Result<LoggerGuard> {
    let level = parse_log_level(&config.level)?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());

    match config.format.as_str() {
        "json" => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_thread_ids(true)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(layer).init();
        }
        _ => {
            let layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_writer(non_blocking)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter);
            tracing_subscriber::registry().with(layer).init();
        }
    }

    tracing::info!(level = %config.level, format = %config.format, "logger initialized");

    Ok(LoggerGuard { _guard: guard })
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("invalid log level: {level}"),
    }
}
