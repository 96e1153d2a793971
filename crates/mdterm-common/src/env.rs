//! The environment child processes are allowed to inherit.

/// Variables a spawned shell or command may inherit from the server.
///
/// Everything else is dropped so server-side secrets (API keys, tokens)
/// never reach a browser-controlled process.
pub const ALLOWED_ENV_VARS: &[&str] = &[
    "HOME",
    "USER",
    "LOGNAME",
    "SHELL",
    "PATH",
    "LANG",
    "LC_ALL",
    "LC_CTYPE",
    "TZ",
    "TMPDIR",
    "TMP",
    "TEMP",
    // Windows-specific
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "SYSTEMROOT",
    "COMSPEC",
    "HOMEDRIVE",
    "HOMEPATH",
];

/// The allowlisted variables that are actually set in this process.
pub fn inherited_env() -> impl Iterator<Item = (&'static str, String)> {
    ALLOWED_ENV_VARS
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|val| (*key, val)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_excludes_secrets() {
        for var in ALLOWED_ENV_VARS {
            let lower = var.to_lowercase();
            for needle in ["key", "secret", "token", "password"] {
                assert!(
                    !lower.contains(needle),
                    "ALLOWED_ENV_VARS should not contain '{var}'"
                );
            }
        }
    }

    #[test]
    fn inherited_env_only_yields_allowlisted_names() {
        for (key, _) in inherited_env() {
            assert!(ALLOWED_ENV_VARS.contains(&key));
        }
    }
}
