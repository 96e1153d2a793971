//! HTTP route handlers for the API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mdterm_exec::{ErrorKind, ExecRequest, ExecResult};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub active_sessions: usize,
}

/// Health check endpoint.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime_seconds(),
        active_sessions: state.registry.count().await,
    })
}

/// Connection info response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminalInfoResponse {
    pub websocket_url: String,
    pub status: &'static str,
    pub message: &'static str,
    pub port: u16,
}

/// Tell clients where the interactive terminal listens.
pub async fn terminal_info(State(state): State<Arc<AppState>>) -> Json<TerminalInfoResponse> {
    Json(TerminalInfoResponse {
        websocket_url: state.websocket_url.clone(),
        status: "available",
        message: "Connect to the WebSocket URL to open an interactive terminal",
        port: state.ws_port,
    })
}

/// Body for requests that are structurally invalid.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body for commands the server failed to run.
#[derive(Debug, Serialize)]
pub struct ExecFailureResponse {
    pub error: String,
    #[serde(flatten)]
    pub result: ExecResult,
}

fn bad_request(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Run one sandboxed command.
///
/// Status codes: 200 for anything that ran (or was a `cd`), even when
/// `isError` is set; 400 for a missing or malformed body; 403 when the
/// safety policy refuses the command; 500 when the process could not be
/// started.
pub async fn execute(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExecRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!(error = %rejection, "Rejected execute body");
            return bad_request(rejection.body_text());
        }
    };

    let Some(command) = request.command.filter(|c| !c.trim().is_empty()) else {
        return bad_request("Command is required");
    };
    let cwd = request.cwd.as_deref();

    info!(
        command = %command,
        cwd = ?cwd,
        "Received execute request"
    );

    match state.executor.execute(&command, cwd).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            let message = e.to_string();
            let result = ExecResult::error(message.clone(), state.executor.echo_cwd(cwd));
            match e.kind() {
                ErrorKind::InvalidRequest => bad_request(message),
                ErrorKind::PolicyRejection => {
                    warn!(command = %command, reason = %message, "Command rejected");
                    (StatusCode::FORBIDDEN, Json(result)).into_response()
                }
                ErrorKind::ResourceFailure => {
                    error!(command = %command, error = %message, "Command execution failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ExecFailureResponse {
                            error: message,
                            result,
                        }),
                    )
                        .into_response()
                }
            }
        }
    }
}
