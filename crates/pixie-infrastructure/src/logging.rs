//! Tracing subscriber bootstrap.
//!
//! Log records go to a daily rolling file so the interactive terminal only
//! shows the conversation.

use pixie_core::error::{PixieError, Result};
use std::fs;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV_VAR: &str = "PIXIE_LOG";
pub const DEFAULT_LOG_FILTER: &str = "pixie=info";
const LOG_FILE_PREFIX: &str = "pixie.log";

/// Builds the filter from `PIXIE_LOG`, or the default when unset or invalid.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber writing to `log_dir`.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the background writer.
pub fn init_logging(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| PixieError::internal(format!("Failed to install logger: {err}")))?;

    tracing::info!("[Logging] Writing logs to {}", log_dir.display());
    Ok(guard)
}
