//! PTY control operations: write input, resize, kill, force-kill.

use portable_pty::{ChildKiller, MasterPty};
use tokio::sync::mpsc;

use super::terminate::kill_session;
use super::types::{Dimensions, PtyError};

/// The controlling side of a spawned shell.
///
/// Dropping a `PtyControl` whose shell has not been marked exited kills the
/// shell, so no code path can leak the process.
pub struct PtyControl {
    /// Sender feeding the `pty-writer` thread.
    input_tx: mpsc::UnboundedSender<Vec<u8>>,
    /// Master PTY handle (for resize).
    master: Box<dyn MasterPty + Send>,
    /// Signals the shell without needing the `Child` owned by the waiter.
    killer: Box<dyn ChildKiller + Send + Sync>,
    /// Current terminal size.
    size: Dimensions,
    pid: Option<u32>,
    exited: bool,
}

impl PtyControl {
    pub(crate) fn new(
        input_tx: mpsc::UnboundedSender<Vec<u8>>,
        master: Box<dyn MasterPty + Send>,
        killer: Box<dyn ChildKiller + Send + Sync>,
        size: Dimensions,
        pid: Option<u32>,
    ) -> Self {
        Self {
            input_tx,
            master,
            killer,
            size,
            pid,
            exited: false,
        }
    }

    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// OS process id of the shell, when the platform reports one.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// Queue raw input bytes for the shell, unmodified.
    ///
    /// Never blocks: bytes are handed to the writer thread and written in
    /// the order they were queued.
    pub fn write_input(&self, data: &[u8]) -> Result<(), PtyError> {
        if data.is_empty() {
            return Ok(());
        }
        self.input_tx
            .send(data.to_vec())
            .map_err(|_| PtyError::InputClosed)
    }

    // =========================================================================
    // RESIZE
    // =========================================================================

    /// Resize the PTY, returning whether a native resize happened.
    ///
    /// Unchanged or zero-sized dimensions are skipped.
    pub fn resize(&mut self, dims: Dimensions) -> Result<bool, PtyError> {
        if dims == self.size || !dims.is_valid() {
            return Ok(false);
        }
        self.master
            .resize(dims.into())
            .map_err(|e| PtyError::ResizeFailed(e.to_string()))?;
        self.size = dims;
        Ok(true)
    }

    // =========================================================================
    // KILL
    // =========================================================================

    /// Deliver a termination signal to the shell.
    pub fn kill(&mut self) {
        if self.exited {
            return;
        }
        if let Err(e) = self.killer.kill() {
            tracing::debug!(pid = ?self.pid, "PTY kill error (may already be dead): {e}");
        }
    }

    /// SIGKILL the shell's whole session, including the terminal's
    /// foreground job and anything else that ignored SIGHUP.
    ///
    /// Unlike [`kill`](Self::kill) this still runs after the shell has been
    /// reaped, because its jobs can outlive it.
    pub fn force_kill(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Some(pgid) = self.master.process_group_leader().filter(|&pgid| pgid > 1) {
                if let Err(e) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                    tracing::debug!(pgid, "killpg of foreground job failed: {e}");
                }
            }
        }
        match self.pid {
            Some(pid) => kill_session(pid),
            None => self.kill(),
        }
    }

    /// A second handle able to signal the same shell, for process-wide
    /// shutdown.
    pub fn clone_killer(&self) -> Box<dyn ChildKiller + Send + Sync> {
        self.killer.clone_killer()
    }

    /// Record that the shell has been reaped so later kills become no-ops.
    pub fn mark_exited(&mut self) {
        self.exited = true;
    }
}

impl Drop for PtyControl {
    fn drop(&mut self) {
        self.kill();
    }
}

// =============================================================================
// TESTS
// =============================================================================
