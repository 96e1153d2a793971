//! mdterm configuration system.
//!
//! TOML-based configuration for the terminal server. Every section uses
//! `serde(default)` so a partial file, or no file at all, yields a working
//! config.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mdterm_config::load_config;
//!
//! let config = load_config(None).expect("failed to load config");
//! println!("terminal listens on port {}", config.server.ws_port);
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{LoggingConfig, MdtermConfig, ServerConfig, ShellConfig, TerminalConfig};

use mdterm_common::ConfigError;
use std::path::Path;

/// Load config from `path` if given, otherwise from the platform default
/// location, falling back to defaults when no file exists there.
///
/// The result is validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<MdtermConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_config_with_explicit_missing_path_fails() {
        let result = load_config(Some(Path::new("/tmp/definitely_missing_mdterm.toml")));
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn load_config_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[terminal]\ncols = 0\n").unwrap();

        let result = load_config(Some(&path));
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn load_config_accepts_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nws_port = 4100\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.server.ws_port, 4100);
        assert_eq!(config.server.http_port, 3001);
    }
}
