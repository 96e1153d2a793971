use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MdtermError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A listener address that is not an IP literal.
    #[error("invalid bind address: {0}")]
    Address(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.ws_port = 0".into());
        assert_eq!(err.to_string(), "config validation error: server.ws_port = 0");
    }

    #[test]
    fn mdterm_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: MdtermError = config_err.into();
        assert!(matches!(err, MdtermError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn mdterm_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: MdtermError = io_err.into();
        assert!(matches!(err, MdtermError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }

    #[test]
    fn address_error_names_the_input() {
        let err = MdtermError::Address("localhost".into());
        assert_eq!(err.to_string(), "invalid bind address: localhost");
    }
}
