//! PTY spawning primitive for interactive terminal sessions.
//!
//! Uses `portable-pty` to run a shell inside a pseudo-terminal. Blocking
//! PTY reads, writes, and the child wait each run on a dedicated OS thread
//! and are bridged to tokio through channels:
//!
//! ```text
//! PtyControl::write_input ──► pty-writer ──► PTY master ──► shell
//! shell ──► PTY master ──► pty-reader ──► PtyProcess::output
//! shell exit ──► pty-waiter ──► PtyProcess::exit
//! ```

mod decode;
mod io;
mod shell;
mod spawn;
mod terminate;
mod types;

pub use decode::Utf8Decoder;
pub use io::PtyControl;
pub use shell::{default_working_directory, detect_shell, shell_args, ShellSpec};
pub use spawn::{spawn_pty, PtyProcess};
pub use terminate::kill_session;
pub use types::{Dimensions, ExitInfo, PtyError, DEFAULT_COLS, DEFAULT_ROWS, PTY_READ_CHUNK};
