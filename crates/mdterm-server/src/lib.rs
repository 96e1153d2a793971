//! mdterm server: interactive terminal sessions over WebSocket plus a
//! small HTTP API for one-shot commands.
//!
//! Two listeners run side by side:
//!
//! ```text
//! browser ──WS──► ws_port   ──► one task per connection ──► PTY shell
//! browser ──HTTP─► http_port ──► /api/terminal/execute  ──► sh -c (timed)
//!                             └─► /api/terminal/info, /health
//! ```
//!
//! Sessions share nothing but the [`SessionRegistry`], which exists so the
//! health endpoint can count them and shutdown can kill them.

pub mod connection;
pub mod http;
pub mod protocol;
pub mod registry;

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use mdterm_common::MdtermError;
use mdterm_config::{MdtermConfig, ShellConfig};
use mdterm_exec::Executor;
use mdterm_pty::{default_working_directory, detect_shell, shell_args, Dimensions, ShellSpec};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;

pub use connection::{handle_connection, SessionContext};
pub use http::{create_router, AppState};
pub use protocol::{ClientFrame, ServerFrame};
pub use registry::{SessionEntry, SessionRegistry};

/// Build the shell launch spec from the `[shell]` config section.
///
/// The working directory is resolved here, once, and reused by every
/// session.
pub fn shell_spec(config: &ShellConfig) -> ShellSpec {
    let program = match config.program_override() {
        Some(program) => program.to_string(),
        None => detect_shell(),
    };
    let mut args = shell_args(&program, config.login_shell);
    args.extend(config.args.iter().cloned());

    ShellSpec {
        program,
        args,
        cwd: default_working_directory(config.working_directory.as_deref()),
        env: config.env_pairs(),
    }
}

/// Resolve `bind:port` into a socket address.
pub fn socket_addr(bind: &str, port: u16) -> Result<SocketAddr, MdtermError> {
    let ip: IpAddr = bind
        .trim()
        .parse()
        .map_err(|_| MdtermError::Address(bind.to_string()))?;
    Ok(SocketAddr::new(ip, port))
}

/// Accept WebSocket connections forever, one session task each.
pub async fn serve_terminal(listener: TcpListener, ctx: SessionContext) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    match accept_async(stream).await {
                        Ok(ws) => handle_connection(ws, addr, ctx).await,
                        Err(e) => {
                            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
                        }
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Serve the HTTP API until the listener fails.
pub async fn serve_http(listener: TcpListener, state: Arc<AppState>) -> Result<(), MdtermError> {
    axum::serve(listener, create_router(state)).await?;
    Ok(())
}

/// Run both listeners until Ctrl-C or SIGTERM, then kill every session.
pub async fn run(config: MdtermConfig) -> Result<(), MdtermError> {
    let server = &config.server;
    let http_addr = socket_addr(&server.bind, server.http_port)?;
    let ws_addr = socket_addr(&server.bind, server.ws_port)?;

    let registry = SessionRegistry::new();
    let shell = shell_spec(&config.shell);
    let size = Dimensions::new(config.terminal.cols, config.terminal.rows);
    tracing::info!(
        shell = %shell.program,
        cwd = %shell.cwd.display(),
        cols = size.cols,
        rows = size.rows,
        "Terminal sessions configured"
    );
    let ctx = SessionContext::new(registry.clone(), shell, size);

    let executor = Executor::from_current_dir()?;
    let state = Arc::new(AppState::new(executor, registry.clone(), server));

    let ws_listener = TcpListener::bind(ws_addr).await?;
    tracing::info!(addr = %ws_addr, url = %server.websocket_url(), "Terminal WebSocket listening");
    let http_listener = TcpListener::bind(http_addr).await?;
    tracing::info!(addr = %http_addr, "HTTP API listening");

    let result = tokio::select! {
        () = serve_terminal(ws_listener, ctx) => Ok(()),
        res = serve_http(http_listener, state) => res,
        () = shutdown_signal() => {
            tracing::info!("Shutdown signal received");
            Ok(())
        }
    };

    let killed = registry.shutdown_all().await;
    tracing::info!(sessions = killed, "Shutdown complete");
    result
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
