//! Logging configuration for storyslides

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "storyslides.log";

/// Initialize logging, letting `RUST_LOG` override the configured level
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// lifetime of the process.
pub fn init_logging_with_config(config: &crate::config::AppConfig) -> Result<WorkerGuard> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let (env_filter, level) = filter_from_env_or_level(rust_log.as_deref(), config.log_level());
    install(env_filter, &level)
}

/// Initialize logging with custom log level
pub fn init_logging_with_level(level: &str) -> Result<WorkerGuard> {
    install(filter_for_level(level), level)
}

fn filter_for_level(level: &str) -> EnvFilter {
    EnvFilter::new(format!("{level},storyslides={level}"))
}

/// Blank or invalid `RUST_LOG` directives fall back to the configured level
fn filter_from_env_or_level(rust_log: Option<&str>, level: &str) -> (EnvFilter, String) {
    let directives = rust_log.map(str::trim).filter(|d| !d.is_empty());
    if let Some(directives) = directives {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return (filter, directives.to_string()),
            Err(e) => eprintln!("Ignoring invalid {}: {e}", EnvFilter::DEFAULT_ENV),
        }
    }
    (filter_for_level(level), level.to_string())
}

fn install(env_filter: EnvFilter, level: &str) -> Result<WorkerGuard> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false); // No colors in file

    // A second init in the same process (tests) keeps the first subscriber
    if Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        tracing::info!("Logging initialized with level: {}", level);
        tracing::info!("Log files will be saved to: {LOG_DIR}/{LOG_FILE_PREFIX}.YYYY-MM-DD");
    }

    Ok(guard)
}
