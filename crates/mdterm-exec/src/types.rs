//! Request, result, and error types for one-shot execution.

use serde::{Deserialize, Serialize};

/// Body of an execute request.
///
/// Both fields are optional at the serde level so a missing command is
/// reported by the executor rather than as a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecRequest {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

/// Aggregated outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub output: String,
    pub cwd: String,
    pub is_error: bool,
}

impl ExecResult {
    pub fn success(output: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            cwd: cwd.into(),
            is_error: false,
        }
    }

    pub fn error(output: impl Into<String>, cwd: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            cwd: cwd.into(),
            is_error: true,
        }
    }
}

/// Broad class of an [`ExecError`], used to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request itself is malformed.
    InvalidRequest,
    /// The command was refused by the safety policy.
    PolicyRejection,
    /// The server could not run the command.
    ResourceFailure,
}

/// Reasons an invocation produced no [`ExecResult`].
///
/// Policy messages start with "Command blocked" / "Command not allowed" and
/// server faults with "Failed to", so callers can tell a refused command
/// from a broken server by the text alone.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("Command is required")]
    EmptyCommand,

    #[error("Command blocked: contains dangerous pattern '{pattern}'")]
    Blocked { pattern: &'static str },

    #[error("Command not allowed: '{command}' is not in the list of permitted commands")]
    NotAllowed { command: String },

    #[error("Failed to execute command: {0}")]
    Spawn(#[from] std::io::Error),
}

impl ExecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::EmptyCommand => ErrorKind::InvalidRequest,
            ExecError::Blocked { .. } | ExecError::NotAllowed { .. } => ErrorKind::PolicyRejection,
            ExecError::Spawn(_) => ErrorKind::ResourceFailure,
        }
    }
}
