// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Sandboxed execution of Python snippets.
//!
//! [`SubprocessSandbox`] runs each snippet in a fresh interpreter:
//!
//! - isolated mode (`-I -B -u`) in a scratch directory that is removed
//!   afterwards, with a minimal environment and stdin from `/dev/null`
//! - its own process group, killed on timeout, cancellation or drop
//! - kernel resource limits (CPU, memory, file size, processes)
//! - stdout/stderr captured concurrently under a size cap
//!
//! The snippet failing is an [`ExecutionResult`], never a [`SandboxError`].

pub mod capture;
pub mod limiter;
pub mod limits;
pub mod process;

pub use capture::TRUNCATION_MARKER;
pub use limiter::{RunLimiter, RunPermit};
pub use limits::ResourceLimits;
pub use process::ProcessGroupGuard;

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::SandboxSettings;
use crate::error::SandboxError;
#[cfg(feature = "telemetry")]
use crate::telemetry::metrics::{record_run, RunOutcome};
use crate::types::{ExecutionResult, SENTINEL_EXIT_CODE};

use capture::{read_bounded, Captured};

/// File name of the snippet inside the scratch directory.
pub const SNIPPET_FILE: &str = "snippet.py";

/// How long output readers may keep draining after the interpreter exits.
const OUTPUT_GRACE: Duration = Duration::from_millis(500);

const FALLBACK_PATH: &str = "/usr/local/bin:/usr/bin:/bin";

/// Runs untrusted code and reports what happened.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionSandbox: Send + Sync {
    /// Execute `code` under `time_limit`. Cancelling `cancel` kills the run.
    async fn execute(
        &self,
        code: &str,
        time_limit: Duration,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult, SandboxError>;
}

/// How the wait for the interpreter ended.
#[derive(Debug, Clone, Copy)]
enum Ending {
    Exited(ExitStatus),
    TimedOut,
    Cancelled,
}

/// Sandbox backed by a local Python interpreter.
#[derive(Debug, Clone)]
pub struct SubprocessSandbox {
    settings: SandboxSettings,
}

impl SubprocessSandbox {
    pub fn new(settings: SandboxSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SandboxSettings {
        &self.settings
    }

    fn command(&self, workdir: &Path, limits: ResourceLimits) -> Command {
        let path = std::env::var("PATH").unwrap_or_else(|_| FALLBACK_PATH.to_string());

        let mut command = Command::new(&self.settings.python);
        command
            .args(["-I", "-B", "-u", SNIPPET_FILE])
            .current_dir(workdir)
            .env_clear()
            .env("PATH", path)
            .env("HOME", workdir)
            .env("TMPDIR", workdir)
            .env("LANG", "C.UTF-8")
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        command.process_group(0);
        limits.apply(&mut command);
        command
    }

    async fn run(
        &self,
        code: &str,
        time_limit: Duration,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult, SandboxError> {
        let scratch = tempfile::Builder::new()
            .prefix("snipd-run-")
            .tempdir()
            .map_err(|e| SandboxError::Setup(format!("scratch directory: {e}")))?;
        let snippet = scratch.path().join(SNIPPET_FILE);
        tokio::fs::write(&snippet, code)
            .await
            .map_err(|e| SandboxError::Setup(format!("writing snippet: {e}")))?;
        self.hand_over(scratch.path(), &snippet)?;

        let limits = ResourceLimits::for_run(&self.settings, time_limit);
        let started = Instant::now();
        let mut child = self.command(scratch.path(), limits).spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                SandboxError::Spawn(format!("{} not found", self.settings.python.display()))
            }
            _ => SandboxError::Spawn(e.to_string()),
        })?;
        let mut group = ProcessGroupGuard::new(child.id());
        debug!(pid = ?child.id(), time_limit_ms = time_limit.as_millis() as u64, "Interpreter started");

        let stop_reading = CancellationToken::new();
        let limit = self.settings.output_limit_bytes;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SandboxError::Io("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| SandboxError::Io("stderr not captured".to_string()))?;
        let stdout_task = tokio::spawn(read_bounded(stdout, limit, stop_reading.clone()));
        let stderr_task = tokio::spawn(read_bounded(stderr, limit, stop_reading.clone()));

        let ending = tokio::select! {
            status = child.wait() => Ending::Exited(status?),
            _ = tokio::time::sleep(time_limit) => Ending::TimedOut,
            _ = cancel.cancelled() => Ending::Cancelled,
        };
        // Stragglers the snippet left behind go with the group.
        group.kill();
        if !matches!(ending, Ending::Exited(_)) {
            if let Err(e) = child.wait().await {
                warn!(error = %e, "Failed to reap interpreter");
            }
        }
        let duration = started.elapsed();

        let grace = stop_reading.clone();
        let grace_timer = tokio::spawn(async move {
            tokio::time::sleep(OUTPUT_GRACE).await;
            grace.cancel();
        });
        let stdout = join_capture(stdout_task).await?;
        let stderr = join_capture(stderr_task).await?;
        grace_timer.abort();

        let truncated = stdout.truncated || stderr.truncated;
        let (exit_code, timed_out) = match ending {
            Ending::Exited(status) => (exit_code(status), false),
            Ending::TimedOut => (SENTINEL_EXIT_CODE, true),
            Ending::Cancelled => (SENTINEL_EXIT_CODE, false),
        };

        #[cfg(feature = "telemetry")]
        record_run(
            match ending {
                Ending::Exited(_) if exit_code == 0 => RunOutcome::Ok,
                Ending::Exited(_) => RunOutcome::Error,
                Ending::TimedOut => RunOutcome::TimedOut,
                Ending::Cancelled => RunOutcome::Cancelled,
            },
            truncated,
        );

        let result = ExecutionResult {
            stdout: stdout.into_text(),
            stderr: stderr.into_text(),
            exit_code,
            timed_out,
            truncated,
            duration_ms: duration.as_millis() as u64,
        };
        info!(
            exit_code,
            timed_out,
            cancelled = cancel.is_cancelled(),
            truncated,
            duration_ms = result.duration_ms,
            stdout_bytes = result.stdout.len(),
            stderr_bytes = result.stderr.len(),
            "Run finished"
        );
        Ok(result)
    }

    /// Give the scratch directory to the unprivileged run user, if any.
    #[cfg(unix)]
    fn hand_over(&self, dir: &Path, snippet: &Path) -> Result<(), SandboxError> {
        use nix::unistd::{chown, Gid, Uid};

        if self.settings.run_as_uid.is_none() && self.settings.run_as_gid.is_none() {
            return Ok(());
        }
        let uid = self.settings.run_as_uid.map(Uid::from_raw);
        let gid = self.settings.run_as_gid.map(Gid::from_raw);
        for path in [dir, snippet] {
            chown(path, uid, gid).map_err(|e| SandboxError::Setup(format!("chown {}: {e}", path.display())))?;
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn hand_over(&self, _dir: &Path, _snippet: &Path) -> Result<(), SandboxError> {
        Ok(())
    }
}

#[async_trait]
impl ExecutionSandbox for SubprocessSandbox {
    async fn execute(
        &self,
        code: &str,
        time_limit: Duration,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult, SandboxError> {
        let result = self.run(code, time_limit, cancel).await;
        if let Err(e) = &result {
            warn!(error = %e, "Sandbox failed");
            #[cfg(feature = "telemetry")]
            record_run(RunOutcome::SandboxFault, false);
        }
        result
    }
}

async fn join_capture(
    task: tokio::task::JoinHandle<std::io::Result<Captured>>,
) -> Result<Captured, SandboxError> {
    task.await
        .map_err(|e| SandboxError::Io(format!("output reader failed: {e}")))?
        .map_err(SandboxError::from)
}

/// Exit status as a number: the code, or 128 + signal when killed.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    SENTINEL_EXIT_CODE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_exit_code_mapping() {
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(1 << 8)), 1);
        // Killed by SIGKILL
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_spawn_error() {
        let sandbox = SubprocessSandbox::new(SandboxSettings {
            python: "/nonexistent/python-for-snipd-tests".into(),
            ..Default::default()
        });
        let err = sandbox
            .execute("print(1)", Duration::from_secs(1), CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SandboxError::Spawn(_)));
    }

    #[tokio::test]
    async fn test_mock_sandbox_contract() {
        let mut sandbox = MockExecutionSandbox::new();
        sandbox.expect_execute().returning(|_, limit, _| {
            Ok(ExecutionResult {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: SENTINEL_EXIT_CODE,
                timed_out: true,
                truncated: false,
                duration_ms: limit.as_millis() as u64,
            })
        });
        let result = sandbox
            .execute("while True: pass", Duration::from_millis(50), CancellationToken::new())
            .await
            .unwrap();
        assert!(result.timed_out);
        assert!(!result.succeeded());
    }
}
