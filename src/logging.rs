use std::fs;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
    Registry,
};

use crate::config::LoggingSettings;
use crate::error::{GridflowError, GridflowResult};

/// Initialize the logging system.
///
/// Console output goes to stderr so stdout stays free for the JSON-lines
/// panel bridge. The returned guard must be held for the lifetime of the
/// process when file logging is enabled, or buffered lines are lost.
pub fn init_logging(config: &LoggingSettings) -> GridflowResult<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gridflow={},warn", config.level)));

    let registry = Registry::default().with(env_filter);

    let guard = if config.enable_file_logging {
        fs::create_dir_all(&config.log_dir)
            .map_err(|e| GridflowError::file_io(config.log_dir.to_string_lossy().to_string(), e))?;

        // Set up file logging with rotation
        let file_appender = rolling::daily(&config.log_dir, "gridflow.log");
        let (file_writer, guard) = non_blocking(file_appender);

        let file_layer = if config.enable_json_format {
            fmt::layer().json().with_writer(file_writer).boxed()
        } else {
            fmt::layer().with_writer(file_writer).with_ansi(false).boxed()
        };

        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact();

        registry
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .map_err(|e| GridflowError::General(anyhow::anyhow!(e)))?;
        Some(guard)
    } else {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .compact();

        registry
            .with(console_layer)
            .try_init()
            .map_err(|e| GridflowError::General(anyhow::anyhow!(e)))?;
        None
    };

    info!(level = %config.level, "logging initialized");
    if config.enable_file_logging {
        info!("File logging enabled: {}", config.log_dir.display());
    }

    Ok(guard)
}

/// Performance logging utilities
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        tracing::debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn checkpoint(&self, checkpoint: &str) {
        let elapsed = self.start.elapsed();
        tracing::debug!("{} - {}: {}us", self.operation, checkpoint, elapsed.as_micros());
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        info!("Completed {}: {:.2}ms", self.operation, elapsed.as_secs_f64() * 1000.0);
    }
}
