//! PTY spawn logic: open a pseudo-terminal and start the shell inside it.

use std::io::{Read, Write};
use std::thread;

use portable_pty::{native_pty_system, Child, MasterPty};
use tokio::sync::{mpsc, oneshot};

use super::io::PtyControl;
use super::shell::ShellSpec;
use super::types::{Dimensions, ExitInfo, PtyError, OUTPUT_CHANNEL_CAPACITY, PTY_READ_CHUNK};

/// A freshly spawned shell, split into the pieces a session task selects on.
pub struct PtyProcess {
    /// Input, resize, and kill.
    pub control: PtyControl,
    /// Output chunks in the order the shell produced them. Closes when the
    /// PTY reaches EOF.
    pub output: mpsc::Receiver<Vec<u8>>,
    /// Resolves once the shell has exited and been reaped.
    pub exit: oneshot::Receiver<ExitInfo>,
}

// =============================================================================
// SPAWN
// =============================================================================

/// Spawn `spec` inside a new PTY of the given size.
///
/// Starts three named threads: `pty-reader` pushes output into
/// [`PtyProcess::output`], `pty-writer` drains [`PtyControl::write_input`],
/// and `pty-waiter` reaps the child and reports through
/// [`PtyProcess::exit`]. If any step after the child starts fails, the child
/// is killed before the error is returned.
pub fn spawn_pty(spec: &ShellSpec, size: Dimensions) -> Result<PtyProcess, PtyError> {
    let pty_system = native_pty_system();

    let pair = pty_system
        .openpty(size.into())
        .map_err(|e| PtyError::OpenFailed(e.to_string()))?;

    let child = pair
        .slave
        .spawn_command(spec.command())
        .map_err(|e| PtyError::SpawnFailed(format!("'{}': {e}", spec.program)))?;

    // Drop the slave side so the reader sees EOF once the shell exits
    drop(pair.slave);

    let pid = child.process_id();
    tracing::debug!(pid = ?pid, shell = %spec.program, "Shell spawned in PTY");

    start_io(pair.master, child, size, pid)
}

fn start_io(
    master: Box<dyn MasterPty + Send>,
    mut child: Box<dyn Child + Send + Sync>,
    size: Dimensions,
    pid: Option<u32>,
) -> Result<PtyProcess, PtyError> {
    let streams = master
        .try_clone_reader()
        .and_then(|reader| master.take_writer().map(|writer| (reader, writer)))
        .map_err(|e| PtyError::OpenFailed(format!("failed to attach PTY streams: {e}")));
    let (mut reader, mut writer) = match streams {
        Ok(streams) => streams,
        Err(e) => return Err(abort(child, e)),
    };

    // Reader: PTY master -> bounded channel. Blocks on a full channel so a
    // slow client applies backpressure to the shell.
    let (output_tx, output_rx) = mpsc::channel::<Vec<u8>>(OUTPUT_CHANNEL_CAPACITY);
    let spawned = thread::Builder::new()
        .name("pty-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; PTY_READ_CHUNK];
            loop {
                match reader.read(&mut buf) {
                    Ok(0) => break, // EOF, shell exited
                    Ok(n) => {
                        if output_tx.blocking_send(buf[..n].to_vec()).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => {
                        tracing::debug!("PTY reader stopped: {e}");
                        break;
                    }
                }
            }
        });
    if let Err(e) = spawned {
        return Err(abort(child, e.into()));
    }

    // Writer: unbounded channel -> PTY master, preserving arrival order.
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    let spawned = thread::Builder::new()
        .name("pty-writer".to_string())
        .spawn(move || {
            while let Some(data) = input_rx.blocking_recv() {
                if let Err(e) = writer.write_all(&data).and_then(|()| writer.flush()) {
                    tracing::debug!("PTY writer stopped: {e}");
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        return Err(abort(child, e.into()));
    }

    let mut killer = child.clone_killer();

    // Waiter: reap the child and report how it ended.
    let (exit_tx, exit_rx) = oneshot::channel();
    let spawned = thread::Builder::new()
        .name("pty-waiter".to_string())
        .spawn(move || {
            let info = match child.wait() {
                Ok(status) => ExitInfo::from(&status),
                Err(e) => {
                    tracing::debug!("PTY wait error: {e}");
                    ExitInfo::unknown()
                }
            };
            let _ = exit_tx.send(info);
        });
    if let Err(e) = spawned {
        // The child moved into the dropped closure; signal it by pid instead.
        let _ = killer.kill();
        return Err(e.into());
    }

    Ok(PtyProcess {
        control: PtyControl::new(input_tx, master, killer, size, pid),
        output: output_rx,
        exit: exit_rx,
    })
}

/// Kill and reap a child whose I/O could not be set up.
fn abort(mut child: Box<dyn Child + Send + Sync>, err: PtyError) -> PtyError {
    let _ = child.kill();
    let _ = child.wait();
    err
}

// =============================================================================
// TESTS
// =============================================================================
