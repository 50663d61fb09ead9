//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// HTTP plumbing is chatty at debug; keep it at warn unless asked otherwise
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn", "rustls=warn"];

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Failed to install subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Map a configured level name to a tracing level. Unknown names fall back
/// to info.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the filter for a base level. `RUST_LOG`, when set, wins.
pub fn build_filter(level: &str) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let mut filter = EnvFilter::new(parse_level(level).to_string());
    for target in QUIET_TARGETS {
        let directive = target
            .parse()
            .map_err(|e| LoggingError::InvalidFilter(format!("{}: {}", target, e)))?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init(level: &str, json: bool) -> Result<(), LoggingError> {
    let filter = build_filter(level)?;

    if json {
        let subscriber = FmtSubscriber::builder()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}
