//! mdterm: remote terminal server for the markdown editor.
//!
//! Serves interactive PTY shells over WebSocket and a sandboxed one-shot
//! command endpoint over HTTP.

use std::path::PathBuf;

use clap::Parser;
use mdterm_common::MdtermError;
use mdterm_config::{load_config, validation, MdtermConfig};

#[derive(Parser)]
#[command(name = "mdterm", version, about = "Remote terminal server for the markdown editor")]
struct Args {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Interface to bind both listeners to.
    #[arg(long)]
    bind: Option<String>,

    /// Port for the HTTP API.
    #[arg(long)]
    http_port: Option<u16>,

    /// Port for the terminal WebSocket.
    #[arg(long)]
    ws_port: Option<u16>,

    /// Shell program for interactive sessions.
    #[arg(long)]
    shell: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    fn apply(self, config: &mut MdtermConfig) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if let Some(port) = self.http_port {
            config.server.http_port = port;
        }
        if let Some(port) = self.ws_port {
            config.server.ws_port = port;
        }
        if let Some(shell) = self.shell {
            config.shell.program = shell;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), MdtermError> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    args.apply(&mut config);
    validation::validate(&config)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("mdterm={}", config.logging.level.to_lowercase()).into()),
        )
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "mdterm starting");

    mdterm_server::run(config).await
}
