//! External tool invocation with wall-clock timeouts.
//!
//! Every encoder invocation in the pipeline goes through this module. A
//! timeout is enforced by polling the child and killing it at the deadline;
//! a timed-out invocation is reported the same way as a non-zero exit so
//! callers apply one fallback path for both.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often the child process is polled while waiting.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Number of stderr lines preserved for diagnostics.
const STDERR_TAIL_LINES: usize = 20;

/// Errors from invoking an external tool.
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool binary could not be located on PATH.
    #[error("{tool} not found on PATH")]
    NotFound { tool: String },

    /// The tool exited with a non-zero status.
    #[error("{tool} failed with exit code {exit_code}: {stderr_tail}")]
    Failed {
        tool: String,
        exit_code: i32,
        stderr_tail: String,
    },

    /// The tool exceeded its wall-clock timeout and was killed.
    #[error("{tool} timed out after {seconds}s")]
    TimedOut { tool: String, seconds: u64 },

    /// Spawning or waiting on the process failed.
    #[error("I/O error running {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for tool invocations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Captured output of a completed tool invocation.
#[derive(Debug, Default)]
pub struct ToolOutput {
    /// Raw stdout bytes.
    pub stdout: Vec<u8>,
    /// Trailing stderr lines (bounded).
    pub stderr_tail: Vec<String>,
}

impl ToolOutput {
    /// Stdout decoded lossily as UTF-8.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Locate a tool binary on PATH.
pub fn locate_tool(tool: &str) -> ToolResult<PathBuf> {
    which::which(tool).map_err(|_| ToolError::NotFound {
        tool: tool.to_string(),
    })
}

/// Run a prepared command with a wall-clock timeout.
///
/// Stdout and stderr are drained on helper threads so the child can never
/// block on a full pipe. On deadline the child is killed and the invocation
/// reported as [`ToolError::TimedOut`].
pub fn run_with_timeout(cmd: &mut Command, tool: &str, timeout: Duration) -> ToolResult<ToolOutput> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    tracing::debug!(tool, ?timeout, "running external tool: {:?}", cmd);

    let mut child = cmd.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ToolError::NotFound {
                tool: tool.to_string(),
            }
        } else {
            ToolError::Io {
                tool: tool.to_string(),
                source: e,
            }
        }
    })?;

    let stdout_handle = child.stdout.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });
    let stderr_handle = child.stderr.take().map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ToolError::TimedOut {
                        tool: tool.to_string(),
                        seconds: timeout.as_secs(),
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                return Err(ToolError::Io {
                    tool: tool.to_string(),
                    source: e,
                })
            }
        }
    };

    let stdout = stdout_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr = stderr_handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default();
    let stderr_tail = tail_lines(&stderr, STDERR_TAIL_LINES);

    if !status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            exit_code: status.code().unwrap_or(-1),
            stderr_tail: stderr_tail.join("\n"),
        });
    }

    Ok(ToolOutput {
        stdout,
        stderr_tail,
    })
}

/// Keep only the last `limit` lines of raw output.
fn tail_lines(bytes: &[u8], limit: usize) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(limit);
    lines[start..].iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_reports_not_found() {
        let mut cmd = Command::new("definitely-not-a-real-binary-xyz");
        let result = run_with_timeout(&mut cmd, "fake", Duration::from_secs(5));
        assert!(matches!(result, Err(ToolError::NotFound { .. })));
    }

    #[test]
    fn successful_command_captures_stdout() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo hello");
        let output = run_with_timeout(&mut cmd, "sh", Duration::from_secs(5)).unwrap();
        assert_eq!(output.stdout_text().trim(), "hello");
    }

    #[test]
    fn failing_command_reports_exit_code_and_stderr() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("echo oops >&2; exit 3");
        let err = run_with_timeout(&mut cmd, "sh", Duration::from_secs(5)).unwrap_err();
        match err {
            ToolError::Failed {
                exit_code,
                stderr_tail,
                ..
            } => {
                assert_eq!(exit_code, 3);
                assert!(stderr_tail.contains("oops"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn slow_command_times_out() {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg("sleep 10");
        let err = run_with_timeout(&mut cmd, "sh", Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, ToolError::TimedOut { .. }));
    }

    #[test]
    fn tail_keeps_only_last_lines() {
        let input = b"a\nb\nc\nd\n";
        assert_eq!(tail_lines(input, 2), vec!["c", "d"]);
        assert_eq!(tail_lines(input, 10).len(), 4);
    }
}
