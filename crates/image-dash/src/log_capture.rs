/// Debug console log capture
///
/// A logger that writes every record into a bounded, thread-safe ring
/// buffer shown by the debug console.
use chrono::{DateTime, Utc};
use log::{Level, Log, Metadata, Record};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Maximum number of log entries to keep in memory
const MAX_LOG_ENTRIES: usize = 1000;

/// A single log entry with timestamp and metadata
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// Thread-safe log buffer shared between logger and UI
pub type LogBuffer = Arc<Mutex<VecDeque<LogEntry>>>;

/// Custom logger that captures logs to both env_logger and our buffer
pub struct DebugConsoleLogger {
    logs: LogBuffer,
    env_logger: env_logger::Logger,
    console_filter: env_logger::Logger,
}

impl DebugConsoleLogger {
    pub fn new(logs: LogBuffer) -> Self {
        // Terminal output is errors only; the TUI owns the screen
        let env_logger = env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Error)
            .build();

        // RUST_LOG wins; otherwise only our own crates at debug
        let console_filter = if std::env::var("RUST_LOG").is_ok() {
            env_logger::Builder::from_default_env().build()
        } else {
            env_logger::Builder::new()
                .filter_module("image_dash", log::LevelFilter::Debug)
                .filter_module("image_catalog", log::LevelFilter::Debug)
                .build()
        };

        Self {
            logs,
            env_logger,
            console_filter,
        }
    }

    pub fn create_buffer() -> LogBuffer {
        Arc::new(Mutex::new(VecDeque::with_capacity(MAX_LOG_ENTRIES)))
    }

    fn capture(&self, record: &Record) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: record.level(),
            target: record.target().to_string(),
            message: format!("{}", record.args()),
        };

        if let Ok(mut logs) = self.logs.lock() {
            if logs.len() >= MAX_LOG_ENTRIES {
                logs.pop_front();
            }
            logs.push_back(entry);
        }
    }
}

impl Log for DebugConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.console_filter.enabled(metadata) || self.env_logger.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.console_filter.enabled(record.metadata()) {
            self.capture(record);
        }

        if self.env_logger.enabled(record.metadata()) {
            self.env_logger.log(record);
        }
    }

    fn flush(&self) {
        self.env_logger.flush();
    }
}

/// Install the debug console logger and return its buffer
///
/// Call once at startup before anything logs. Without `RUST_LOG` the
/// console shows the `image_dash` and `image_catalog` crates at debug level;
/// set e.g. `RUST_LOG=reqwest=debug` to see dependencies as well.
pub fn init_logger() -> anyhow::Result<LogBuffer> {
    let logs = DebugConsoleLogger::create_buffer();
    let logger = DebugConsoleLogger::new(logs.clone());

    log::set_boxed_logger(Box::new(logger))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;
    log::set_max_level(log::LevelFilter::Debug);

    log::info!("Debug console initialized - press ` or ~ to toggle");

    Ok(logs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(logger: &DebugConsoleLogger, message: &str) {
        logger.capture(
            &Record::builder()
                .args(format_args!("{}", message))
                .level(Level::Debug)
                .target("image_dash::task")
                .build(),
        );
    }

    #[test]
    fn test_buffer_is_bounded() {
        let logs = DebugConsoleLogger::create_buffer();
        let logger = DebugConsoleLogger::new(logs.clone());

        for i in 0..(MAX_LOG_ENTRIES + 5) {
            record_at(&logger, &format!("entry {}", i));
        }

        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs.front().map(|e| e.message.as_str()), Some("entry 5"));
        assert_eq!(logs.back().map(|e| e.target.as_str()), Some("image_dash::task"));
    }
}
