//! Timed subprocess execution with captured, size-capped output.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use mdterm_common::inherited_env;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Bytes read from one output stream.
#[derive(Debug, Default)]
pub(crate) struct Captured {
    pub bytes: Vec<u8>,
    /// More bytes arrived than the cap allowed.
    pub truncated: bool,
}

impl Captured {
    pub fn to_text(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.bytes).into_owned();
        if self.truncated {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str("[output truncated]\n");
        }
        text
    }
}

#[derive(Debug)]
pub(crate) enum RunOutcome {
    Completed {
        stdout: Captured,
        stderr: Captured,
        status: ExitStatus,
    },
    TimedOut,
}

/// Run `command` through the platform shell in `dir`.
///
/// stdin is closed and the environment is reduced to
/// [`ALLOWED_ENV_VARS`](mdterm_common::ALLOWED_ENV_VARS). The child gets its
/// own process group so that, on timeout, the whole group (including
/// anything the shell forked) is killed rather than just the shell.
pub(crate) async fn run(
    command: &str,
    dir: &Path,
    limit: Duration,
    max_output: usize,
) -> std::io::Result<RunOutcome> {
    let mut cmd = shell_command(command);
    // Only the allowlisted environment; server secrets stay in the server
    cmd.env_clear().envs(inherited_env());
    cmd.current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn()?;
    let pid = child.id();
    tracing::debug!(pid = ?pid, command = %command, dir = %dir.display(), "Spawned command");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let work = async {
        let (stdout, stderr, status) = tokio::join!(
            read_capped(stdout, max_output),
            read_capped(stderr, max_output),
            child.wait()
        );
        Ok::<_, std::io::Error>((stdout?, stderr?, status?))
    };
    let waited = tokio::time::timeout(limit, work).await;

    match waited {
        Ok(Ok((stdout, stderr, status))) => Ok(RunOutcome::Completed {
            stdout,
            stderr,
            status,
        }),
        Ok(Err(e)) => {
            kill_process_group(pid);
            let _ = child.kill().await;
            Err(e)
        }
        Err(_) => {
            tracing::warn!(pid = ?pid, command = %command, timeout_secs = limit.as_secs(), "Command timed out, killing");
            kill_process_group(pid);
            // Also kills and reaps the shell itself if it survived the group kill
            let _ = child.kill().await;
            Ok(RunOutcome::TimedOut)
        }
    }
}

fn shell_command(command: &str) -> Command {
    #[cfg(windows)]
    {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(command);
        cmd
    }
    #[cfg(not(windows))]
    {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command);
        cmd
    }
}

/// Read a stream to EOF, keeping at most `max` bytes.
///
/// Reading continues past the cap so the child never blocks on a full pipe.
async fn read_capped<R: AsyncRead + Unpin>(
    reader: Option<R>,
    max: usize,
) -> std::io::Result<Captured> {
    let mut captured = Captured::default();
    let Some(mut reader) = reader else {
        return Ok(captured);
    };

    let mut buf = [0u8; 8_192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        let room = max.saturating_sub(captured.bytes.len());
        let take = n.min(room);
        captured.bytes.extend_from_slice(&buf[..take]);
        if take < n {
            captured.truncated = true;
        }
    }
    Ok(captured)
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid else { return };
    let Ok(raw) = i32::try_from(pid) else { return };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::debug!(pid, "killpg failed (group may be gone): {e}");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
