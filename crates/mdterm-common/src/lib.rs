//! Types shared by every mdterm crate: the error taxonomy, session ids and
//! the inherited-environment allowlist.

pub mod env;
pub mod errors;
pub mod id;

pub use env::{inherited_env, ALLOWED_ENV_VARS};
pub use errors::{ConfigError, MdtermError};
pub use id::SessionId;
