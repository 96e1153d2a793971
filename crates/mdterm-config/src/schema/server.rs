use serde::{Deserialize, Serialize};

/// Listener addresses for the HTTP API and the terminal WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface both listeners bind to.
    pub bind: String,
    /// Port for the HTTP API (executor, connection info, health).
    pub http_port: u16,
    /// Port for the interactive terminal WebSocket.
    pub ws_port: u16,
    /// Host name advertised to clients in the connection info response.
    pub public_host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            http_port: 3001,
            ws_port: 3002,
            public_host: "localhost".into(),
        }
    }
}

impl ServerConfig {
    /// `ws://host:port` URL clients should open for an interactive session.
    pub fn websocket_url(&self) -> String {
        format!("ws://{}:{}", self.public_host, self.ws_port)
    }
}
