//! Configuration validation.
//!
//! Each check pushes a message into a shared list so a single
//! `ConfigError` reports every problem at once.

mod helpers;


use crate::schema::{MdtermConfig, LOG_LEVELS};
use helpers::validate_range;
use mdterm_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &MdtermConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_server(&mut errors, config);
    validate_terminal(&mut errors, config);
    validate_logging(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_server(errors: &mut Vec<String>, config: &MdtermConfig) {
    let server = &config.server;
    if server.bind.trim().is_empty() {
        errors.push("server.bind must not be empty".into());
    }
    if server.http_port == 0 {
        errors.push("server.http_port must be non-zero".into());
    }
    if server.ws_port == 0 {
        errors.push("server.ws_port must be non-zero".into());
    }
    if server.http_port != 0 && server.http_port == server.ws_port {
        errors.push(format!(
            "server.http_port and server.ws_port must differ (both {})",
            server.http_port
        ));
    }
}

fn validate_terminal(errors: &mut Vec<String>, config: &MdtermConfig) {
    validate_range(errors, "terminal.cols", config.terminal.cols.into(), 1, 1000);
    validate_range(errors, "terminal.rows", config.terminal.rows.into(), 1, 1000);
}

fn validate_logging(errors: &mut Vec<String>, config: &MdtermConfig) {
    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(format!(
            "logging.level = {:?} is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }
}
