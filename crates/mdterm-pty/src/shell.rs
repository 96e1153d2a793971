//! Shell detection, argument helpers, and the sanitized launch spec.

use std::path::PathBuf;

use mdterm_common::inherited_env;
use portable_pty::CommandBuilder;

// =============================================================================
// SHELL DETECTION
// =============================================================================

/// Detect the user's default shell.
///
/// - Unix: reads `$SHELL`, falls back to `/bin/sh`
/// - Windows: reads `$COMSPEC`, falls back to `cmd.exe`
pub fn detect_shell() -> String {
    #[cfg(unix)]
    {
        std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
    }

    #[cfg(windows)]
    {
        std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string())
    }

    #[cfg(not(any(unix, windows)))]
    {
        "/bin/sh".to_string()
    }
}

/// Login flags for shells that support them.
pub fn shell_args(shell: &str, login: bool) -> Vec<String> {
    if login && (shell.ends_with("zsh") || shell.ends_with("bash")) {
        vec!["--login".to_string()]
    } else {
        vec![]
    }
}

/// Resolve the directory new shells start in.
///
/// Uses `configured` (with a leading `~` expanded) when given, then the
/// user's home directory, then the server's own working directory.
pub fn default_working_directory(configured: Option<&str>) -> PathBuf {
    if let Some(dir) = configured.map(str::trim).filter(|d| !d.is_empty()) {
        return expand_home(dir);
    }
    dirs::home_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("/"))
}

fn expand_home(dir: &str) -> PathBuf {
    let home = dirs::home_dir();
    match (dir.strip_prefix('~'), home) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(dir),
    }
}

// =============================================================================
// SHELL SPEC
// =============================================================================

/// Everything needed to launch the shell for a new session.
///
/// Resolved once at startup and shared by every session.
#[derive(Debug, Clone)]
pub struct ShellSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Extra variables applied after the inherited allowlist.
    pub env: Vec<(String, String)>,
}

impl ShellSpec {
    /// Build a sanitized `CommandBuilder` for this spec.
    pub(crate) fn command(&self) -> CommandBuilder {
        let mut cmd = CommandBuilder::new(&self.program);
        cmd.args(&self.args);
        cmd.cwd(&self.cwd);

        // Clear inherited env, then selectively re-add safe vars
        cmd.env_clear();
        for (key, val) in inherited_env() {
            cmd.env(key, val);
        }
        for (key, val) in &self.env {
            cmd.env(key, val);
        }

        // Always set TERM for proper terminal behavior
        cmd.env("TERM", "xterm-256color");
        cmd
    }
}

// =============================================================================
// TESTS
// =============================================================================
