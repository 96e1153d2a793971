//! Per-connection session task: spawn a shell, register, then pump bytes
//! between the PTY and the WebSocket until either side ends.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use mdterm_common::SessionId;
use mdterm_pty::{spawn_pty, Dimensions, ExitInfo, PtyControl, PtyProcess, ShellSpec, Utf8Decoder};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::protocol::{ClientFrame, ServerFrame};
use crate::registry::{SessionEntry, SessionRegistry};

type WsSink = SplitSink<WebSocketStream<TcpStream>, Message>;
type WsStream = SplitStream<WebSocketStream<TcpStream>>;

/// How long output still buffered in the PTY is forwarded after the shell
/// exits.
pub const EXIT_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// How long a disconnected session's shell gets to exit on SIGHUP before
/// its whole session is SIGKILLed.
pub const HANGUP_GRACE: Duration = Duration::from_millis(500);

/// How long teardown waits for a SIGKILLed shell to be reaped.
pub const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Everything a connection needs to start a session. Cheap to clone.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: SessionRegistry,
    pub shell: Arc<ShellSpec>,
    pub initial_size: Dimensions,
}

impl SessionContext {
    pub fn new(registry: SessionRegistry, shell: ShellSpec, initial_size: Dimensions) -> Self {
        Self {
            registry,
            shell: Arc::new(shell),
            initial_size,
        }
    }
}

/// Why the forwarding loop stopped.
enum SessionEnd {
    Exited(ExitInfo),
    ClientClosed,
    TransportError,
}

/// Handle a single WebSocket connection for its whole life.
pub async fn handle_connection(ws: WebSocketStream<TcpStream>, addr: SocketAddr, ctx: SessionContext) {
    let (mut sink, mut stream) = ws.split();

    // 1. Spawn the shell. Failure ends this connection only.
    let PtyProcess {
        mut control,
        mut output,
        mut exit,
    } = match spawn_pty(&ctx.shell, ctx.initial_size) {
        Ok(process) => process,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "Failed to start terminal session");
            let _ = send_frame(
                &mut sink,
                &ServerFrame::Error {
                    message: format!("Failed to start terminal: {e}"),
                },
            )
            .await;
            let _ = sink.close().await;
            return;
        }
    };

    // 2. Register.
    let session_id = SessionId::new();
    ctx.registry
        .insert(
            session_id,
            SessionEntry {
                peer: addr,
                pid: control.pid(),
                killer: control.clone_killer(),
                created_at: Instant::now(),
            },
        )
        .await;

    tracing::info!(
        peer = %addr,
        session = %session_id,
        pid = ?control.pid(),
        shell = %ctx.shell.program,
        "Terminal session started"
    );

    // 3. Announce.
    let announced = send_frame(
        &mut sink,
        &ServerFrame::Connected {
            session_id: session_id.to_string(),
        },
    )
    .await;

    // 4. Forwarding loop.
    let end = if announced.is_err() {
        SessionEnd::TransportError
    } else {
        pump(&mut control, &mut output, &mut exit, &mut sink, &mut stream, &session_id).await
    };

    // 5. Cleanup.
    ctx.registry.remove(&session_id).await;
    match end {
        SessionEnd::Exited(info) => {
            control.mark_exited();
            tracing::info!(
                session = %session_id,
                code = ?info.code,
                signal = ?info.signal,
                "Shell exited"
            );
            let _ = send_frame(
                &mut sink,
                &ServerFrame::Exit {
                    code: info.code,
                    signal: info.signal,
                },
            )
            .await;
            let _ = sink.close().await;
        }
        SessionEnd::ClientClosed | SessionEnd::TransportError => {
            tracing::info!(peer = %addr, session = %session_id, "Client disconnected, killing shell");
            control.kill();
            let mut reaped = tokio::time::timeout(HANGUP_GRACE, &mut exit).await.is_ok();
            if !reaped {
                tracing::debug!(session = %session_id, pid = ?control.pid(), "Shell ignored SIGHUP, sending SIGKILL");
            }
            // Jobs that ignore SIGHUP can outlive a shell that did not.
            control.force_kill();
            if !reaped {
                reaped = tokio::time::timeout(REAP_TIMEOUT, &mut exit).await.is_ok();
            }
            if reaped {
                control.mark_exited();
            } else {
                tracing::warn!(session = %session_id, pid = ?control.pid(), "Shell not reaped in time");
            }
        }
    }
}

/// Run the `select!` loop until the shell exits or the client goes away.
///
/// On shell exit, output already queued is drained (bounded by
/// [`EXIT_DRAIN_GRACE`]) before returning so the final `output` frames
/// precede `exit`.
async fn pump(
    control: &mut PtyControl,
    output: &mut mpsc::Receiver<Vec<u8>>,
    exit: &mut tokio::sync::oneshot::Receiver<ExitInfo>,
    sink: &mut WsSink,
    stream: &mut WsStream,
    session_id: &SessionId,
) -> SessionEnd {
    let mut decoder = Utf8Decoder::new();
    let mut output_open = true;

    let end = loop {
        tokio::select! {
            chunk = output.recv(), if output_open => {
                match chunk {
                    Some(bytes) => {
                        if forward_output(sink, &mut decoder, &bytes).await.is_err() {
                            break SessionEnd::TransportError;
                        }
                    }
                    // PTY hit EOF; keep waiting for the exit status
                    None => output_open = false,
                }
            }

            status = &mut *exit => {
                break SessionEnd::Exited(status.unwrap_or_else(|_| ExitInfo::unknown()));
            }

            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => handle_client_text(control, &text, session_id),
                    Some(Ok(Message::Binary(_))) => {
                        tracing::debug!(session = %session_id, "Ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sink.send(Message::Pong(data)).await.is_err() {
                            break SessionEnd::TransportError;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break SessionEnd::ClientClosed,
                    Some(Err(e)) => {
                        tracing::debug!(session = %session_id, error = %e, "WS error");
                        break SessionEnd::TransportError;
                    }
                    _ => {}
                }
            }
        }
    };

    if let SessionEnd::Exited(_) = end {
        let deadline = tokio::time::Instant::now() + EXIT_DRAIN_GRACE;
        while output_open {
            match tokio::time::timeout_at(deadline, output.recv()).await {
                Ok(Some(bytes)) => {
                    // The shell is already reaped, so a dead client only
                    // cuts the drain short
                    if forward_output(sink, &mut decoder, &bytes).await.is_err() {
                        return end;
                    }
                }
                Ok(None) | Err(_) => output_open = false,
            }
        }
        let tail = decoder.finish();
        if !tail.is_empty() {
            let _ = send_frame(sink, &ServerFrame::Output { data: tail }).await;
        }
    }

    end
}

async fn forward_output(
    sink: &mut WsSink,
    decoder: &mut Utf8Decoder,
    bytes: &[u8],
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let data = decoder.decode(bytes);
    if data.is_empty() {
        return Ok(());
    }
    send_frame(sink, &ServerFrame::Output { data }).await
}

/// Apply one client text frame. Malformed frames are ignored.
fn handle_client_text(control: &mut PtyControl, text: &str, session_id: &SessionId) {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!(session = %session_id, error = %e, "Ignoring malformed frame");
            return;
        }
    };

    match frame {
        ClientFrame::Input { data } => {
            if let Err(e) = control.write_input(data.as_bytes()) {
                tracing::debug!(session = %session_id, error = %e, "Input dropped");
            }
        }
        ClientFrame::Resize { cols, rows } => match control.resize(Dimensions::new(cols, rows)) {
            Ok(true) => tracing::debug!(session = %session_id, cols, rows, "PTY resized"),
            Ok(false) => {}
            Err(e) => tracing::warn!(session = %session_id, error = %e, "Resize failed"),
        },
    }
}

/// Send a ServerFrame as a JSON text frame.
async fn send_frame(sink: &mut WsSink, frame: &ServerFrame) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode frame");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
