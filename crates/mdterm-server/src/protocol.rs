//! Interactive session wire protocol: JSON text frames tagged by `type`.

use serde::{Deserialize, Serialize};

/// Frames a browser client sends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Keystrokes or pasted text, written to the shell unmodified.
    Input { data: String },

    /// New terminal size in character cells.
    Resize { cols: u16, rows: u16 },
}

/// Frames the server sends. `Connected` is always first; `Exit` or `Error`,
/// if sent, is always last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Connected {
        #[serde(rename = "sessionId")]
        session_id: String,
    },

    Output { data: String },

    /// `code` is null when the shell was killed by a signal.
    Exit {
        code: Option<i32>,
        signal: Option<String>,
    },

    Error { message: String },
}
