use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

/// File name prefix of the daily rolling log
pub const LOG_FILE_PREFIX: &str = "metabolic-monitor.log";

/// Initialize tracing for structured logging
///
/// The terminal belongs to the dashboard, so events go to a daily rolling
/// file under `log_dir`. `RUST_LOG` selects the level (default `info`).
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_logging(log_dir: &Path) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer),
        )
        .with(env_filter)
        .try_init()?;

    Ok(guard)
}
