//! Logging initialisation via tracing-subscriber.
//!
//! [`init`] installs the process-wide diagnostic subscriber once at startup.
//! [`scoped_file`] installs a per-thread subscriber writing to an application
//! run log; the returned guard restores the previous subscriber on drop.

use std::{fs::OpenOptions, io, path::Path, sync::Mutex};

use tracing::level_filters::LevelFilter;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::error::AppError;

/// Default run-log mask: alert, critical, error and warning.
pub const DEFAULT_LOG_MASK: u32 = 15;

/// Initialise the global tracing subscriber.
///
/// `level` accepts standard level strings or any `EnvFilter` directive and
/// takes precedence over `RUST_LOG`; `RUST_LOG` is only the fallback when
/// `level` is invalid.
pub fn init(level: &str, log_file: Option<&Path>) -> Result<(), AppError> {
    let filter = match EnvFilter::try_new(level) {
        Ok(filter) => filter,
        Err(level_err) => EnvFilter::try_from_default_env().map_err(|env_err| {
            AppError::Logger(format!(
                "invalid log level '{level}': {level_err}; RUST_LOG parse failed: {env_err}"
            ))
        })?,
    };

    let writer = if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| {
            AppError::Logger(format!("failed to open log file '{}': {e}", path.display()))
        })?;
        BoxMakeWriter::new(Mutex::new(file))
    } else {
        BoxMakeWriter::new(io::stderr)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))?;

    Ok(())
}

/// Map an ORE log mask onto the most verbose level it enables.
///
/// Bits: 1 alert, 2 critical, 4 error, 8 warning, 16 notice, 32 debug,
/// 64 data, 128 memory.
pub fn level_from_mask(mask: u32) -> LevelFilter {
    match mask {
        0 => LevelFilter::OFF,
        m if m >= 64 => LevelFilter::TRACE,
        m if m >= 32 => LevelFilter::DEBUG,
        m if m >= 16 => LevelFilter::INFO,
        m if m >= 8 => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

/// Open `path` for appending and make it this thread's log sink until the
/// guard is dropped.
pub fn scoped_file(path: &Path, level: LevelFilter) -> io::Result<DefaultGuard> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish();
    Ok(tracing::subscriber::set_default(subscriber))
}
