//! Logger initialization.

use std::io::Write;

use colored::*;
use log::LevelFilter;

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Initializes `env_logger` with the given level and line format.
///
/// `RUST_LOG` is read first and `level` then overrides it for this crate, so
/// `RUST_LOG=reqwest=debug` still works alongside `--log-level info`.
///
/// Plain lines look like `2026-01-01T12:00:00Z INFO  centinela::worker consumer-0 acked job 12`.
/// JSON lines carry `ts` (epoch millis), `level`, `target` and `msg`, one object
/// per line, for log shippers.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    builder.filter_module("html5ever", LevelFilter::Error);
    builder.filter_module("selectors", LevelFilter::Warn);
    // sqlx logs every statement at info; queue polling would flood the output
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.filter_module("centinela", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{{\"ts\":{},\"level\":\"{}\",\"target\":\"{}\",\"msg\":{}}}",
                    chrono::Utc::now().timestamp_millis(),
                    record.level(),
                    record.target(),
                    serde_json::to_string(&record.args().to_string())
                        .unwrap_or_else(|_| "\"\"".into())
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let label = format!("{:<5}", level);
                let colored_level = match level {
                    log::Level::Error => label.red().bold(),
                    log::Level::Warn => label.yellow(),
                    log::Level::Info => label.green(),
                    log::Level::Debug => label.blue(),
                    log::Level::Trace => label.purple(),
                };
                writeln!(
                    buf,
                    "{} {} {} {}",
                    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                    colored_level,
                    record.target().cyan(),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}
