use std::env;
use std::fs;
use std::path::Path;
use tagdex_core::config::LoggingConfig;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Map a configured level name onto a tracing directive.
fn directive_for(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "debug" => "debug",
        "info" => "info",
        "warning" | "warn" => "warn",
        _ => "error",
    }
}

/// Console output goes to stderr at `console_level`. When file logging is
/// enabled, a second layer writes to `log_file` at the configured level,
/// overridable with `TRACING_LEVEL`. Keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn init_logger(
    config: &LoggingConfig,
    log_file: &Path,
    console_level: LevelFilter,
) -> Option<WorkerGuard> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_ansi(true)
        .with_filter(console_level);

    let (file_layer, guard) = match file_writer(config, log_file) {
        Some((writer, guard)) => {
            let filter = env::var("TRACING_LEVEL")
                .unwrap_or_else(|_| directive_for(&config.level).to_string());
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(filter));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    debug!("Tracing is configured for console and file logging.");
    guard
}

fn file_writer(
    config: &LoggingConfig,
    log_file: &Path,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if !config.enabled {
        return None;
    }
    let file_name = log_file.file_name()?;
    let directory = match log_file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if let Err(err) = fs::create_dir_all(directory) {
        eprintln!(
            "warning: cannot create log directory {}: {}",
            directory.display(),
            err
        );
        return None;
    }
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    Some(tracing_appender::non_blocking(file_appender))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_for_config_levels() {
        assert_eq!(directive_for("warning"), "warn");
        assert_eq!(directive_for("DEBUG"), "debug");
        assert_eq!(directive_for("fatal"), "error");
    }
}
