//! Per-batch logger with file and callback output.
//!
//! Each batch run gets its own logger that writes to a dedicated log file,
//! forwards lines to an optional callback, filters progress updates in
//! compact mode, and keeps a tail buffer of external-tool output for error
//! diagnosis.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

/// Per-batch logger with dual output (file + callback).
pub struct BatchLogger {
    batch_name: String,
    log_path: PathBuf,
    file_writer: Arc<Mutex<Option<BufWriter<File>>>>,
    callback: Arc<Mutex<Option<LogCallback>>>,
    config: LogConfig,
    /// Recent external-tool output lines, shown after an encoder failure.
    tail_buffer: Arc<Mutex<VecDeque<String>>>,
    /// Last progress value logged (for compact mode filtering).
    last_progress: Arc<Mutex<u32>>,
}

impl BatchLogger {
    /// Create a new batch logger writing to `{log_dir}/{batch_name}.log`.
    pub fn new(
        batch_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let batch_name = batch_name.into();
        let log_dir = log_dir.as_ref();

        fs::create_dir_all(log_dir)?;
        let log_path = log_dir.join(format!("{}.log", batch_name.replace(['/', '\\'], "_")));

        let file = File::create(&log_path)?;

        Ok(Self {
            batch_name,
            log_path,
            file_writer: Arc::new(Mutex::new(Some(BufWriter::new(file)))),
            callback: Arc::new(Mutex::new(callback)),
            config,
            tail_buffer: Arc::new(Mutex::new(VecDeque::with_capacity(100))),
            last_progress: Arc::new(Mutex::new(0)),
        })
    }

    /// Get the batch name.
    pub fn batch_name(&self) -> &str {
        &self.batch_name
    }

    /// Get the log file path.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at the specified level.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }
        let formatted = self.format_message(message);
        self.output(&formatted);
    }

    /// Log an info message.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a debug message.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log a warning message.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    /// Log an error message.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// Log a command being executed.
    pub fn command(&self, command: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Command.format(command));
    }

    /// Log a stage marker.
    pub fn stage(&self, stage_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Stage.format(stage_name));
    }

    /// Log a success message.
    pub fn success(&self, message: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Success.format(message));
    }

    /// Log a progress update (filtered in compact mode).
    ///
    /// Returns true if the progress line was logged, false if filtered.
    pub fn progress(&self, percent: u32) -> bool {
        if self.config.compact {
            let mut last = self.last_progress.lock();
            let step = self.config.progress_step.max(1);

            let current_step = (percent / step) * step;
            let last_step = (*last / step) * step;
            if current_step <= last_step && percent < 100 && percent != 0 {
                return false;
            }
            *last = percent;
        }

        self.log(LogLevel::Info, &format!("Progress: {}%", percent));
        true
    }

    /// Record an external-tool output line (stderr from ffmpeg, typically).
    ///
    /// Always added to the tail buffer; echoed to the log only outside
    /// compact mode.
    pub fn tool_output(&self, line: &str) {
        {
            let mut buffer = self.tail_buffer.lock();
            if buffer.len() >= self.config.error_tail {
                buffer.pop_front();
            }
            buffer.push_back(line.to_string());
        }

        if self.config.compact {
            return;
        }
        self.output(&self.format_message(&format!("[tool] {}", line)));
    }

    /// Show the tail buffer, typically after an encoder failure.
    pub fn show_tail(&self, header: &str) {
        let buffer = self.tail_buffer.lock();
        if buffer.is_empty() {
            return;
        }
        self.output(&self.format_message(&format!("[{}/tail]", header)));
        for line in buffer.iter() {
            self.output(&self.format_message(line));
        }
    }

    /// Clear the tail buffer (between external invocations).
    pub fn clear_tail(&self) {
        self.tail_buffer.lock().clear();
    }

    /// Flush the log file.
    pub fn flush(&self) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writer.flush();
        }
    }

    /// Close the logger and release the file handle.
    pub fn close(&self) {
        self.flush();
        *self.file_writer.lock() = None;
    }

    fn format_message(&self, message: &str) -> String {
        if self.config.show_timestamps {
            let timestamp = Local::now().format("%H:%M:%S");
            format!("[{}] {}", timestamp, message)
        } else {
            message.to_string()
        }
    }

    fn output(&self, line: &str) {
        if let Some(ref mut writer) = *self.file_writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(ref callback) = *self.callback.lock() {
            callback(line);
        }
    }
}

impl Drop for BatchLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    #[test]
    fn writes_to_file_and_callback() {
        let dir = tempdir().unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let logger = BatchLogger::new(
            "test_batch",
            dir.path(),
            LogConfig::default(),
            Some(Box::new(move |_| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            })),
        )
        .unwrap();

        logger.info("hello");
        logger.warn("careful");
        logger.close();

        assert_eq!(count.load(Ordering::SeqCst), 2);
        let content = fs::read_to_string(logger.log_path()).unwrap();
        assert!(content.contains("hello"));
        assert!(content.contains("[WARNING] careful"));
    }

    #[test]
    fn compact_mode_filters_repeated_progress() {
        let dir = tempdir().unwrap();
        let logger =
            BatchLogger::new("progress", dir.path(), LogConfig::default(), None).unwrap();

        assert!(logger.progress(0));
        assert!(!logger.progress(3));
        assert!(logger.progress(10));
        assert!(!logger.progress(12));
        assert!(logger.progress(100));
    }

    #[test]
    fn tail_buffer_is_bounded() {
        let dir = tempdir().unwrap();
        let config = LogConfig {
            error_tail: 3,
            ..LogConfig::default()
        };
        let logger = BatchLogger::new("tail", dir.path(), config, None).unwrap();

        for i in 0..10 {
            logger.tool_output(&format!("line {}", i));
        }
        let buffer = logger.tail_buffer.lock().clone();
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.front().unwrap(), "line 7");
    }
}
