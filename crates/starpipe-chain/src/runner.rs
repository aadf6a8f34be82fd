//! External command runner collaborator
//!
//! [`CommandRunner`] is the seam between the chain and the operating
//! system: it takes argv plus optional stdin text and returns the fully
//! captured stdout, stderr, and exit status. Implementations must drain
//! stdout completely and reap the process before returning, so callers
//! never observe partial-read races.
//!
//! [`ProcessRunner`] is the production implementation on top of
//! `tokio::process`. Test suites substitute a scripted double.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Exit status of a finished external process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitInfo {
    code: Option<i32>,
    success: bool,
}

impl ExitInfo {
    /// A clean zero exit
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            code: Some(0),
            success: true,
        }
    }

    /// A non-zero exit with the given code
    #[inline]
    #[must_use]
    pub fn failure(code: i32) -> Self {
        Self {
            code: Some(code),
            success: code == 0,
        }
    }

    /// Abnormal termination with no exit code (killed by signal)
    #[inline]
    #[must_use]
    pub fn signaled() -> Self {
        Self {
            code: None,
            success: false,
        }
    }

    /// True for a zero exit
    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.success
    }

    /// Exit code, when the process exited normally
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<i32> {
        self.code
    }
}

impl From<std::process::ExitStatus> for ExitInfo {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            success: status.success(),
        }
    }
}

/// Fully captured result of one external command invocation
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Complete standard output text
    pub stdout: String,
    /// Complete standard error text
    pub stderr: String,
    /// Exit status
    pub status: ExitInfo,
}

impl RunOutput {
    /// A successful invocation that produced the given stdout
    #[inline]
    #[must_use]
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            status: ExitInfo::ok(),
        }
    }
}

/// Errors raised by a command runner
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The process could not be spawned (not found, not executable, ...)
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Program that failed to start
        program: String,
        /// Underlying spawn error
        #[source]
        source: std::io::Error,
    },

    /// The process did not finish within the configured limit
    #[error("`{program}` did not finish within {secs}s")]
    Timeout {
        /// Program that was cut off
        program: String,
        /// Configured limit in seconds
        secs: u64,
    },

    /// I/O failed while exchanging data with the process
    #[error("i/o error talking to `{program}`: {source}")]
    Io {
        /// Program involved
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// External command runner collaborator.
///
/// Contract: by the time `run` returns, the process has exited and stdout
/// and stderr are fully drained. The runner reports transport-level
/// failures only; a non-zero exit is returned in [`RunOutput::status`] for
/// the caller to judge.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `argv` to completion, feeding `stdin` when supplied.
    async fn run(&self, argv: &[String], stdin: Option<&str>) -> Result<RunOutput, RunnerError>;
}

/// Real-process runner built on `tokio::process`.
///
/// Stdin is piped only when input text is supplied, otherwise null. The
/// child and its pipes are released on every exit path: `kill_on_drop`
/// covers the timeout path, and `wait_with_output` reaps the normal one.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Runner with no time limit
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runner that kills a stage exceeding `timeout`
    #[inline]
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, argv: &[String], stdin: Option<&str>) -> Result<RunOutput, RunnerError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(RunnerError::Launch {
                program: String::new(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty argv"),
            });
        };

        let mut command = tokio::process::Command::new(program);
        command
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| RunnerError::Launch {
            program: program.clone(),
            source,
        })?;

        // Feed stdin from a separate task so a child that fills its stdout
        // pipe before reading all of its input cannot deadlock us.
        let write_task = match (stdin, child.stdin.take()) {
            (Some(text), Some(mut pipe)) => {
                let text = text.to_string();
                Some(tokio::spawn(async move {
                    let result = pipe.write_all(text.as_bytes()).await;
                    drop(pipe);
                    result
                }))
            }
            _ => None,
        };

        let wait = child.wait_with_output();
        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, wait)
                .await
                .map_err(|_| RunnerError::Timeout {
                    program: program.clone(),
                    secs: limit.as_secs(),
                })?,
            None => wait.await,
        }
        .map_err(|source| RunnerError::Io {
            program: program.clone(),
            source,
        })?;

        if let Some(task) = write_task {
            // A child may legitimately exit without reading all of its
            // stdin; the exit status is what decides the stage's fate.
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(program = %program, error = %err, "stdin write incomplete"),
                Err(err) => warn!(program = %program, error = %err, "stdin writer task failed"),
            }
        }

        Ok(RunOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_info_constructors() {
        assert!(ExitInfo::ok().success());
        assert_eq!(ExitInfo::ok().code(), Some(0));
        assert!(!ExitInfo::failure(2).success());
        assert_eq!(ExitInfo::failure(2).code(), Some(2));
        assert!(!ExitInfo::signaled().success());
        assert_eq!(ExitInfo::signaled().code(), None);
    }

    #[test]
    fn run_output_success_helper() {
        let out = RunOutput::success("(A\n)A\n");
        assert!(out.status.success());
        assert_eq!(out.stdout, "(A\n)A\n");
        assert!(out.stderr.is_empty());
    }

    #[tokio::test]
    async fn process_runner_rejects_empty_argv() {
        let runner = ProcessRunner::new();
        let result = runner.run(&[], None).await;
        assert!(matches!(result, Err(RunnerError::Launch { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_captures_stdout() {
        let runner = ProcessRunner::new();
        let argv = vec!["echo".to_string(), "hello".to_string()];
        let out = runner.run(&argv, None).await.unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout, "hello\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_pipes_stdin() {
        let runner = ProcessRunner::new();
        let argv = vec!["cat".to_string()];
        let out = runner.run(&argv, Some("(A\n)A\n")).await.unwrap();
        assert!(out.status.success());
        assert_eq!(out.stdout, "(A\n)A\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_reports_missing_program() {
        let runner = ProcessRunner::new();
        let argv = vec!["starpipe-no-such-binary".to_string()];
        let result = runner.run(&argv, None).await;
        assert!(matches!(result, Err(RunnerError::Launch { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_times_out() {
        let runner = ProcessRunner::with_timeout(Duration::from_millis(50));
        let argv = vec!["sleep".to_string(), "5".to_string()];
        let result = runner.run(&argv, None).await;
        assert!(matches!(result, Err(RunnerError::Timeout { .. })));
    }
}
