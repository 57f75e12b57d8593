use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::constants::{LOG_DIRECTORY, LOG_FILE_NAME};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info,scanner_bridge=debug";

/// Initializes the global logging facility.
///
/// If `RUST_LOG` is not set, the global default logging level is `info`, and `scanner_bridge`
/// logs at `debug`.
///
/// Log messages are printed to standard output (as JSON lines when `json_output` is set) and
/// appended to a log file that rotates daily. File output is written from a background thread;
/// keep the returned guard alive for as long as the process logs, dropping it flushes the file.
///
/// # Panics
///
/// Panics if the initialization was unsuccessful, likely because a global subscriber was already
/// installed.
pub fn initialize_logging(json_output: bool) -> WorkerGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_appender = tracing_appender::rolling::daily(LOG_DIRECTORY, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(json_output.then(|| fmt::layer().json()))
        .with((!json_output).then(fmt::layer))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    guard
}
