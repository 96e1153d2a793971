//! Config path resolution.

use mdterm_common::ConfigError;

/// Get the platform-specific default config file path.
///
/// On macOS: `~/Library/Application Support/mdterm/config.toml`
/// On Linux: `~/.config/mdterm/config.toml`
pub fn default_config_path() -> Result<std::path::PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("mdterm").join("config.toml"))
}
