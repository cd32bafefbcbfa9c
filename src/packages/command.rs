use crate::core::types::Source;
use crate::error::{AllpacError, Result};
use crate::ui;
use std::io::Read;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs backend subprocesses with a deadline.
///
/// Every child is polled rather than waited on so that a timeout or a
/// Ctrl-C can kill it instead of leaving the tool hanging on a stuck
/// package manager.
#[derive(Debug, Clone, Copy)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run with stdout/stderr captured
    pub fn output(&self, cmd: &mut Command) -> Result<Output> {
        let cmd_debug = describe(cmd);
        debug!(command = %cmd_debug, "running captured");

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| AllpacError::SystemCommandFailed {
            command: cmd_debug.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AllpacError::SystemCommandFailed {
                command: cmd_debug.clone(),
                reason: "Failed to capture stdout".to_string(),
            })?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| AllpacError::SystemCommandFailed {
                command: cmd_debug.clone(),
                reason: "Failed to capture stderr".to_string(),
            })?;

        let stdout_thread = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = std::io::BufReader::new(stdout).read_to_end(&mut buf);
            buf
        });
        let stderr_thread = thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = std::io::BufReader::new(stderr).read_to_end(&mut buf);
            buf
        });

        let status = match self.poll(&mut child, &cmd_debug, Duration::from_millis(50)) {
            Ok(status) => status,
            Err(e) => {
                let _ = stdout_thread.join();
                let _ = stderr_thread.join();
                return Err(e);
            }
        };

        let stdout = stdout_thread.join().unwrap_or_default();
        let stderr = stderr_thread.join().unwrap_or_default();

        Ok(Output {
            status,
            stdout,
            stderr,
        })
    }

    /// Run attached to the terminal so sudo prompts and progress bars work
    pub fn interactive(&self, cmd: &mut Command) -> Result<ExitStatus> {
        let cmd_debug = describe(cmd);
        debug!(command = %cmd_debug, "running interactive");

        cmd.stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let mut child = cmd.spawn().map_err(|e| AllpacError::SystemCommandFailed {
            command: cmd_debug.clone(),
            reason: e.to_string(),
        })?;

        self.poll(&mut child, &cmd_debug, Duration::from_millis(100))
    }

    fn poll(
        &self,
        child: &mut std::process::Child,
        cmd_debug: &str,
        interval: Duration,
    ) -> Result<ExitStatus> {
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if ui::is_interrupted() {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(AllpacError::Interrupted);
                    }
                    if start.elapsed() > self.timeout {
                        warn!(command = cmd_debug, "command timed out, killing");
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(AllpacError::SystemCommandFailed {
                            command: cmd_debug.to_string(),
                            reason: format!(
                                "Command timed out after {} seconds",
                                self.timeout.as_secs()
                            ),
                        });
                    }
                    thread::sleep(interval);
                }
                Err(e) => {
                    return Err(AllpacError::SystemCommandFailed {
                        command: cmd_debug.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}

/// `program arg arg` for logs and error messages
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Charge a runner failure to `source`. Cancellation and errors that
/// already carry a meaning of their own pass through unchanged.
pub fn attribute(source: Source, err: AllpacError) -> AllpacError {
    match err {
        AllpacError::Interrupted
        | AllpacError::NotFound(_)
        | AllpacError::Backend { .. }
        | AllpacError::InvalidPackageName(_) => err,
        other => AllpacError::backend(source, other.to_string()),
    }
}

/// Short reason for a failed captured command: the last stderr lines,
/// falling back to stdout, then to the exit status.
pub fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let text = if stderr.trim().is_empty() {
        stdout
    } else {
        stderr
    };

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let tail = lines[lines.len().saturating_sub(3)..].join("; ");
    if tail.is_empty() {
        format!("exited with {}", output.status)
    } else {
        tail
    }
}
