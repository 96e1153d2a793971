//! Application state for the HTTP API.

use mdterm_config::ServerConfig;
use mdterm_exec::Executor;

use crate::registry::SessionRegistry;

/// Shared application state for the HTTP API.
pub struct AppState {
    /// Runs one-shot commands for `/api/terminal/execute`.
    pub executor: Executor,

    /// Live interactive sessions (read for health counts).
    pub registry: SessionRegistry,

    /// Where clients open interactive sessions.
    pub websocket_url: String,
    pub ws_port: u16,

    /// Server start time (for health checks)
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(executor: Executor, registry: SessionRegistry, server: &ServerConfig) -> Self {
        Self {
            executor,
            registry,
            websocket_url: server.websocket_url(),
            ws_port: server.ws_port,
            start_time: std::time::Instant::now(),
        }
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
