//! Logging initialization for the connector.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for the daemon.
///
/// The default filter comes from `level` (unrecognized strings fall back to
/// info), raised to `debug` when the connector's debug-mode option is on.
/// `RUST_LOG` always wins when set.
///
/// # Example
///
/// ```ignore
/// init_logging("info", false);
/// tracing::info!("Connector started");
/// ```
pub fn init_logging(level: &str, debug_mode: bool) {
    let default_level = if debug_mode {
        tracing::Level::DEBUG
    } else {
        parse_level(level)
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string()));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Parse a log level string into a tracing Level, defaulting to info.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
