//! Logging infrastructure.
//!
//! Two layers, used together:
//! - [`BatchLogger`]: per-batch log file plus an optional line callback,
//!   with compact progress filtering and a tail buffer of encoder output.
//! - `tracing`: library-level diagnostics for the media layer, initialized
//!   once via [`init_tracing`].

mod batch_logger;
mod types;

pub use batch_logger::BatchLogger;
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to the provided default level.
/// Call once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(filter)
        .init();
}

fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
