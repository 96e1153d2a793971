//! Forced termination of a shell's whole session.
//!
//! A PTY shell is started with `setsid`, so it leads a session and a
//! process group whose ids equal its pid. SIGHUP through portable-pty's
//! killer is only a request: a shell or job that ignores it survives.
//! [`kill_session`] is the escalation. It SIGKILLs the leader's process
//! group and, where `/proc` is available, every other process still in the
//! session (jobs that job control moved into their own groups).

/// SIGKILL everything belonging to the session led by `leader`.
///
/// Safe to call after the leader is reaped: its session and group ids
/// outlive it while any member remains. Pids 0 and 1 are ignored.
#[cfg(unix)]
pub fn kill_session(leader: u32) {
    use nix::sys::signal::{kill, killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(leader) else { return };
    if raw <= 1 {
        return;
    }
    let sid = Pid::from_raw(raw);

    for member in session_members(sid) {
        if let Err(e) = kill(member, Signal::SIGKILL) {
            tracing::debug!(pid = %member, "kill failed (may already be dead): {e}");
        }
    }
    if let Err(e) = killpg(sid, Signal::SIGKILL) {
        tracing::debug!(pgid = leader, "killpg failed (group may be gone): {e}");
    }
}

#[cfg(not(unix))]
pub fn kill_session(_leader: u32) {}

/// Processes other than `sid` itself whose session id is `sid`.
#[cfg(target_os = "linux")]
fn session_members(sid: nix::unistd::Pid) -> Vec<nix::unistd::Pid> {
    use nix::unistd::{getsid, Pid};

    let Ok(entries) = std::fs::read_dir("/proc") else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str()?.parse::<i32>().ok())
        .map(Pid::from_raw)
        .filter(|pid| *pid != sid && getsid(Some(*pid)).is_ok_and(|s| s == sid))
        .collect()
}

#[cfg(all(unix, not(target_os = "linux")))]
fn session_members(_sid: nix::unistd::Pid) -> Vec<nix::unistd::Pid> {
    Vec::new()
}
