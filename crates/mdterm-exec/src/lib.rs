//! Sandboxed one-shot command execution.
//!
//! Each invocation is a pure request/response pair: the caller supplies
//! the command and its working directory, the executor validates both,
//! runs the command once under a hard timeout, and returns the aggregated
//! output. No process or directory state survives between calls.
//!
//! Validation runs in a fixed order, each step short-circuiting:
//!
//! 1. non-empty command
//! 2. denylist substring scan ([`policy::BLOCKED_PATTERNS`])
//! 3. allowlist check on the first token ([`policy::ALLOWED_COMMANDS`])
//! 4. working-directory sanitization ([`paths::sanitize_working_dir`])

mod executor;
pub mod paths;
pub mod policy;
mod runner;
mod types;

pub use executor::{Executor, COMMAND_TIMEOUT, MAX_OUTPUT_BYTES};
pub use types::{ErrorKind, ExecError, ExecRequest, ExecResult};
