//! Config loading from explicit and platform-default paths.

use mdterm_common::ConfigError;
use std::path::Path;
use tracing::info;

use super::paths::default_config_path;
use crate::schema::MdtermConfig;

/// Load config from a specific TOML file path.
///
/// Missing fields fall back to their serde defaults. Validation is left to
/// the caller.
pub fn load_from_path(path: &Path) -> Result<MdtermConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::ParseError(format!("failed to read {}: {e}", path.display()))
    })?;

    let config: MdtermConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("failed to parse TOML: {e}")))?;

    info!("loaded config from {}", path.display());
    Ok(config)
}

/// Load config from the platform default path, or defaults if no file exists.
///
/// Unlike a desktop app, the server never writes a config file on its own.
pub fn load_default() -> Result<MdtermConfig, ConfigError> {
    let path = match default_config_path() {
        Ok(path) => path,
        Err(e) => {
            info!("{e}, using default config");
            return Ok(MdtermConfig::default());
        }
    };

    if !path.exists() {
        info!("no config found at {}, using defaults", path.display());
        return Ok(MdtermConfig::default());
    }

    load_from_path(&path)
}
