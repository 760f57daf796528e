//! Tracing setup for the CLI.
//!
//! Log lines go to stdout in the compact format. A second file layer is
//! added when a log file can be opened: `LOREFORGE_LOG_FILE` names the
//! target explicitly, otherwise `logs/loreforge.log` is used. File writes
//! go through a non-blocking worker so ingestion loops never wait on disk.

use std::sync::OnceLock;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Keeps the non-blocking worker alive for the life of the process; dropping
/// the guard would silently stop file output.
static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global tracing subscriber.
///
/// Filtering honors `RUST_LOG` and defaults to `info`. Failure to set up the
/// file layer is reported on stderr and logging continues stdout-only.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match file_writer() {
        Some(writer) => {
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        None => registry.init(),
    }
}

/// Open the log target and wrap it in a non-blocking writer, stashing the
/// worker guard. `None` means no file layer gets installed.
fn file_writer() -> Option<NonBlocking> {
    let file: Box<dyn std::io::Write + Send> = match std::env::var("LOREFORGE_LOG_FILE") {
        Ok(path) => {
            let opened = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path);
            match opened {
                Ok(file) => Box::new(file),
                Err(err) => {
                    eprintln!("Failed to open log file {path}: {err}");
                    return None;
                }
            }
        }
        Err(_) => {
            if let Err(err) = std::fs::create_dir_all("logs") {
                eprintln!("Failed to create logs directory: {err}");
                return None;
            }
            Box::new(tracing_appender::rolling::never("logs", "loreforge.log"))
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let _ = LOG_GUARD.set(guard);
    Some(non_blocking)
}
