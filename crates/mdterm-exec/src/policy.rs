//! Command safety policy: a substring denylist and a first-token allowlist.
//!
//! The policy does not parse shell grammar. A compound command (`a | b`,
//! `a && b`) passes the allowlist on its first token alone, so the
//! denylist scan over the whole text is what catches a dangerous call
//! chained after an allowed one.

use std::collections::HashSet;
use std::sync::LazyLock;

use tracing::warn;

use crate::types::ExecError;

/// Destructive phrases. Matched as substrings of the lowercased command.
pub const BLOCKED_PATTERNS: &[&str] = &[
    // Recursive deletes of root or home
    "rm -rf /",
    "rm -fr /",
    "rm -rf ~",
    "rm -fr ~",
    "rm -rf *",
    // Privilege escalation
    "sudo ",
    "su root",
    "su -",
    "doas ",
    // Disk formatting and raw device writes
    "mkfs",
    "fdisk",
    "dd if=",
    "format c:",
    "> /dev/sd",
    "> /dev/nvme",
    // Power state
    "shutdown",
    "reboot",
    "poweroff",
    "halt",
    "init 0",
    "init 6",
    // Misc
    ":(){ :|:& };:",
    "chmod -r 777 /",
    "chown -r",
];

/// Commands permitted as the first token (read-only and dev tooling).
pub static ALLOWED_COMMANDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    HashSet::from([
        // Navigation and inspection
        "cd", "ls", "pwd", "tree", "file", "stat", "du", "df", "which", "whoami", "date", "env",
        "echo", "clear",
        // Reading and searching
        "cat", "head", "tail", "less", "more", "grep", "find", "wc", "diff", "sort", "uniq",
        // Light file management
        "touch", "mkdir", "cp", "mv",
        // Version control
        "git",
        // Languages, package managers, and build tools
        "node", "npm", "npx", "yarn", "pnpm", "python", "python3", "pip", "pip3", "cargo",
        "rustc", "make",
        // Document tooling
        "pandoc", "marp",
    ])
});

/// First whitespace-delimited token of a command.
pub fn base_command(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

/// First denylist pattern found in `command`, if any.
pub fn find_blocked_pattern(command: &str) -> Option<&'static str> {
    let lowered = command.to_lowercase();
    BLOCKED_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lowered.contains(pattern))
}

pub fn is_allowed(base: &str) -> bool {
    ALLOWED_COMMANDS.contains(base)
}

/// Run the denylist, then the allowlist, against `command`.
pub fn check(command: &str) -> Result<(), ExecError> {
    if let Some(pattern) = find_blocked_pattern(command) {
        warn!(command = %command, pattern = %pattern, "Command blocked by denylist");
        return Err(ExecError::Blocked { pattern });
    }

    let base = base_command(command).ok_or(ExecError::EmptyCommand)?;
    if !is_allowed(base) {
        warn!(command = %command, base_cmd = %base, "Command not in allowlist");
        return Err(ExecError::NotAllowed {
            command: base.to_string(),
        });
    }

    Ok(())
}
