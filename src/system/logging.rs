//! Logging system initialization

use crate::config::LoggingConfig;
use tracing_appender::rolling;

type BoxedWriter = Box<dyn std::io::Write + Send + Sync>;

fn build_writer(logging: &LoggingConfig) -> BoxedWriter {
    let Some(log_file) = logging.file.as_deref().filter(|f| !f.is_empty()) else {
        return Box::new(std::io::stdout());
    };

    let path = std::path::Path::new(log_file);
    if logging.enable_rotation {
        let dir = path.parent().unwrap_or(std::path::Path::new("."));
        let prefix = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("linktracker.log")
            .trim_end_matches(".log")
            .to_string();
        match rolling::Builder::new()
            .rotation(rolling::Rotation::DAILY)
            .filename_prefix(prefix)
            .filename_suffix("log")
            .max_log_files(logging.max_backups as usize)
            .build(dir)
        {
            Ok(appender) => return Box::new(appender),
            Err(e) => eprintln!("[WARN] Failed to create rolling log appender: {}", e),
        }
    } else {
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
        {
            Ok(file) => return Box::new(file),
            Err(e) => eprintln!("[WARN] Failed to open log file {}: {}", log_file, e),
        }
    }

    Box::new(std::io::stdout())
}

/// Initialize the tracing subscriber
///
/// The returned guard must stay alive for the whole program so the
/// non-blocking writer flushes. Call once, after the config is loaded.
pub fn init_logging(logging: &LoggingConfig) -> tracing_appender::non_blocking::WorkerGuard {
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(build_writer(logging));
    let filter = tracing_subscriber::EnvFilter::new(logging.level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(logging.file.as_ref().is_none_or(|f| f.is_empty()));

    // try_init: tests may initialise more than once
    let result = if logging.format == "json" {
        subscriber_builder.json().try_init()
    } else {
        subscriber_builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("[WARN] Logging already initialised: {}", e);
    }

    guard
}
