use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use crate::paths::{resolve_cd_target, sanitize_working_dir};
use crate::policy;
use crate::runner::{self, RunOutcome};
use crate::types::{ExecError, ExecResult};

/// Wall-clock limit for one invocation.
pub const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-stream capture limit.
pub const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// Stateless command executor.
///
/// The server's working directory is captured once at construction and
/// used as the fallback for every request; the process-wide current
/// directory is never changed.
#[derive(Debug, Clone)]
pub struct Executor {
    server_cwd: PathBuf,
    timeout: Duration,
    max_output: usize,
}

impl Executor {
    pub fn new(server_cwd: impl Into<PathBuf>) -> Self {
        Self {
            server_cwd: server_cwd.into(),
            timeout: COMMAND_TIMEOUT,
            max_output: MAX_OUTPUT_BYTES,
        }
    }

    /// Executor anchored at the process's current directory.
    pub fn from_current_dir() -> std::io::Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_output(mut self, max_output: usize) -> Self {
        self.max_output = max_output;
        self
    }

    /// The `cwd` reported back when a request is refused before it runs.
    pub fn echo_cwd(&self, requested: Option<&str>) -> String {
        match requested.filter(|c| !c.trim().is_empty()) {
            Some(cwd) => cwd.to_string(),
            None => self.server_cwd.display().to_string(),
        }
    }

    /// Validate and run one command.
    ///
    /// `Err` is returned only for requests that never reach a process
    /// (empty or refused commands) and for spawn failures. Everything that
    /// happens once the command is accepted, including a missing
    /// directory, a failing `cd` and a timeout, is an `Ok` result with
    /// `is_error` set.
    pub async fn execute(&self, command: &str, cwd: Option<&str>) -> Result<ExecResult, ExecError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ExecError::EmptyCommand);
        }
        policy::check(command)?;

        let echoed = self.echo_cwd(cwd);
        let dir = sanitize_working_dir(cwd, &self.server_cwd);

        if policy::base_command(command) == Some("cd") {
            let target = command.strip_prefix("cd").unwrap_or_default();
            return Ok(change_directory(target, &dir, echoed));
        }

        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Working directory missing");
            return Ok(ExecResult::error(
                format!("Directory not found: {}", dir.display()),
                echoed,
            ));
        }

        info!(command = %command, dir = %dir.display(), "Executing command");
        let outcome = runner::run(command, &dir, self.timeout, self.max_output).await?;

        match outcome {
            RunOutcome::Completed {
                stdout,
                stderr,
                status,
            } => {
                let is_error = !stderr.bytes.is_empty() || !status.success();
                let mut output = stdout.to_text();
                output.push_str(&stderr.to_text());
                if output.is_empty() && !status.success() {
                    output = match status.code() {
                        Some(code) => format!("Command failed with exit code {code}"),
                        None => "Command terminated by signal".to_string(),
                    };
                }
                debug!(
                    command = %command,
                    code = ?status.code(),
                    is_error,
                    bytes = output.len(),
                    "Command finished"
                );
                Ok(ExecResult {
                    output,
                    cwd: echoed,
                    is_error,
                })
            }
            RunOutcome::TimedOut => Ok(ExecResult::error(
                format!("Command timed out after {} seconds", self.timeout.as_secs()),
                echoed,
            )),
        }
    }
}

/// Handle `cd` without spawning anything.
fn change_directory(target: &str, base: &Path, echoed: String) -> ExecResult {
    let shown = if target.trim().is_empty() {
        "~"
    } else {
        target.trim()
    };

    match resolve_cd_target(target, base) {
        Some(resolved) if resolved.is_dir() => {
            debug!(from = %base.display(), to = %resolved.display(), "cd resolved");
            ExecResult::success("", resolved.display().to_string())
        }
        Some(_) => ExecResult::error(format!("cd: no such file or directory: {shown}"), echoed),
        None => ExecResult::error(format!("cd: permission denied: {shown}"), echoed),
    }
}
