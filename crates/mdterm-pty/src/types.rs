//! PTY types: terminal dimensions, exit reports, and errors.

use portable_pty::PtySize;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Maximum bytes read from a PTY in a single read call (8 KB).
pub const PTY_READ_CHUNK: usize = 8_192;

/// Output chunks buffered between the reader thread and the session task.
pub(crate) const OUTPUT_CHANNEL_CAPACITY: usize = 64;

/// Default terminal columns.
pub const DEFAULT_COLS: u16 = 80;

/// Default terminal rows.
pub const DEFAULT_ROWS: u16 = 24;

// =============================================================================
// DIMENSIONS
// =============================================================================

/// Terminal size in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub cols: u16,
    pub rows: u16,
}

impl Dimensions {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// A zero-sized terminal is never valid.
    pub fn is_valid(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS)
    }
}

impl From<Dimensions> for PtySize {
    fn from(dims: Dimensions) -> Self {
        PtySize {
            rows: dims.rows,
            cols: dims.cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }
}

// =============================================================================
// EXIT INFO
// =============================================================================

/// How the shell process ended.
///
/// Exactly one of `code` / `signal` is set for a normal report; both are
/// `None` when the exit status could not be collected.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<String>,
}

impl ExitInfo {
    pub fn unknown() -> Self {
        Self::default()
    }
}

impl From<&portable_pty::ExitStatus> for ExitInfo {
    fn from(status: &portable_pty::ExitStatus) -> Self {
        match status.signal() {
            Some(signal) => Self {
                code: None,
                signal: Some(signal.to_string()),
            },
            None => Self {
                code: Some(status.exit_code() as i32),
                signal: None,
            },
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors originating from PTY operations.
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("failed to open PTY: {0}")]
    OpenFailed(String),

    #[error("failed to spawn shell {0}")]
    SpawnFailed(String),

    #[error("failed to resize PTY: {0}")]
    ResizeFailed(String),

    #[error("PTY input channel closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// =============================================================================
// TESTS
// =============================================================================
