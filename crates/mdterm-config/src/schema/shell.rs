//! `[shell]`: what interactive sessions run.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shell launched for every interactive terminal session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell program. Blank means `$SHELL` (or `$COMSPEC` on Windows).
    pub program: String,
    /// Arguments appended after the login flag.
    pub args: Vec<String>,
    /// Directory sessions start in, `~` allowed. `None` means home.
    pub working_directory: Option<String>,
    /// Variables set on top of the inherited safe environment.
    pub env: HashMap<String, String>,
    /// Add `--login` for bash and zsh.
    pub login_shell: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            program: String::new(),
            args: Vec::new(),
            working_directory: None,
            env: HashMap::new(),
            login_shell: true,
        }
    }
}

impl ShellConfig {
    /// The configured program, or `None` when it should be auto-detected.
    pub fn program_override(&self) -> Option<&str> {
        Some(self.program.trim()).filter(|p| !p.is_empty())
    }

    /// Extra environment as pairs sorted by name, so every session sees
    /// the same order.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<_> = self
            .env
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort();
        pairs
    }
}
