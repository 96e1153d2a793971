//! Session registry: maps session ids to the live shell behind each
//! connection.
//!
//! The registry never owns a session's process. Each session task owns its
//! PTY; the registry only keeps a second kill handle and the shell's pid so
//! a process-wide shutdown can stop every shell.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use mdterm_common::SessionId;
use mdterm_pty::kill_session;
use portable_pty::ChildKiller;
use tokio::sync::RwLock;

/// Bookkeeping for one open session.
pub struct SessionEntry {
    pub peer: SocketAddr,
    pub pid: Option<u32>,
    pub killer: Box<dyn ChildKiller + Send + Sync>,
    pub created_at: Instant,
}

/// Thread-safe session registry, cloned into every connection handler.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<SessionId, SessionEntry>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: SessionId, entry: SessionEntry) {
        self.sessions.write().await.insert(id, entry);
    }

    /// Remove a session. Returns false if it was already gone (for example
    /// after a shutdown drained the registry).
    pub async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Number of active sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Shell pid of a session, if it is registered and the platform
    /// reported one.
    pub async fn pid(&self, id: &SessionId) -> Option<u32> {
        self.sessions.read().await.get(id).and_then(|e| e.pid)
    }

    /// Kill every registered shell and empty the registry. Returns how many
    /// sessions were stopped.
    ///
    /// Each shell gets SIGHUP and then its whole session gets SIGKILL, so
    /// shells and jobs that ignore the hangup do not outlive the server.
    pub async fn shutdown_all(&self) -> usize {
        let drained: Vec<_> = self.sessions.write().await.drain().collect();
        let count = drained.len();
        for (id, mut entry) in drained {
            tracing::info!(
                session = %id,
                peer = %entry.peer,
                pid = ?entry.pid,
                age_secs = entry.created_at.elapsed().as_secs(),
                "Killing session for shutdown"
            );
            if let Err(e) = entry.killer.kill() {
                tracing::debug!(session = %id, error = %e, "Kill failed (may already be dead)");
            }
            // The process exits right after this, so there is no SIGHUP grace.
            if let Some(pid) = entry.pid {
                kill_session(pid);
            }
        }
        count
    }
}
