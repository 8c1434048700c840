use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "info";

pub struct FileLogger {
    log_directory: PathBuf,
    file_prefix: String,
    rotation: Rotation,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf, file_prefix: impl Into<String>) -> Self {
        Self {
            log_directory,
            file_prefix: file_prefix.into(),
            rotation: Rotation::DAILY,
        }
    }

    pub fn setup_file_logging(&self) -> std::io::Result<(NonBlocking, WorkerGuard)> {
        // Ensure log directory exists
        std::fs::create_dir_all(&self.log_directory)?;

        let file_appender = RollingFileAppender::new(
            self.rotation.clone(),
            &self.log_directory,
            &self.file_prefix,
        );

        Ok(tracing_appender::non_blocking(file_appender))
    }
}

/// Console logging filtered by `RUST_LOG` (default `info`), plus a rolling
/// file when `LOG_DIR` is set. Keep the returned guard alive for the life
/// of the process or buffered file lines are lost.
pub fn setup_logging(file_prefix: &str) -> Option<WorkerGuard> {
    let filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
    };

    let file_logger = std::env::var("LOG_DIR")
        .ok()
        .filter(|dir| !dir.trim().is_empty())
        .map(|dir| FileLogger::new(PathBuf::from(dir), file_prefix));

    let (file_layer, guard) = match file_logger.map(|logger| logger.setup_file_logging()) {
        Some(Ok((writer, guard))) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false) // Disable ANSI colors for file logs
                    .with_filter(filter()),
            ),
            Some(guard),
        ),
        Some(Err(e)) => {
            eprintln!("Could not set up file logging: {}", e);
            (None, None)
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(filter())) // Console output
        .with(file_layer)
        .init();

    guard
}
