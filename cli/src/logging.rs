//! Logging initialization: logs go to a file or are dropped, never to the console.
//!
//! - **RUST_LOG**: level filter, e.g. `info`, `formloom=debug`. Default: `info`.
//! - **LOG_FILE**: when set, logs are appended there (no ANSI) through a non-blocking
//!   writer; keep the returned guard alive until exit so buffered lines are flushed.
//!   When unset, logs are dropped so stdout holds only the conversation.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub fn init() -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let Ok(path) = std::env::var("LOG_FILE") else {
        let sink = tracing_subscriber::fmt::layer()
            .with_writer(std::io::sink)
            .with_filter(filter);
        tracing_subscriber::registry().with(sink).try_init()?;
        return Ok(None);
    };

    let path = Path::new(&path);
    let dir = match path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| format!("LOG_FILE has no file name: {}", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_filter(filter);
    tracing_subscriber::registry().with(file_layer).try_init()?;
    tracing::info!(path = %path.display(), "formloom logging to file");
    Ok(Some(guard))
}
