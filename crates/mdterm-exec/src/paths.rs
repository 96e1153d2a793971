//! Working-directory sanitization.
//!
//! All checks here are lexical; nothing touches the filesystem except the
//! final existence checks done by the executor.

use std::path::{Component, Path, PathBuf};

/// Expand a leading `~` (alone or followed by `/`) to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    let home = match dirs::home_dir() {
        Some(home) => home,
        None => return PathBuf::from(path),
    };
    if path == "~" {
        home
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Lexically normalize a path: drop `.`, fold `name/..` pairs, and clamp
/// `..` at the root. A relative path that climbs above its start keeps
/// its leading `..` components.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                Some(Component::ParentDir) | Some(Component::CurDir) | None => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Whether any component of `path` is `..`.
pub fn has_traversal(path: &Path) -> bool {
    path.components().any(|c| c == Component::ParentDir)
}

/// Resolve the directory a command runs in.
///
/// A blank or missing `requested` means `server_cwd`. A path containing a
/// `..` component is never honoured: the server's own directory is used
/// instead, without reporting an error. Relative paths are anchored at
/// `server_cwd`. Existence is not checked here.
pub fn sanitize_working_dir(requested: Option<&str>, server_cwd: &Path) -> PathBuf {
    let requested = match requested.map(str::trim).filter(|r| !r.is_empty()) {
        Some(requested) => requested,
        None => return server_cwd.to_path_buf(),
    };

    let expanded = expand_home(requested);
    if has_traversal(&expanded) {
        tracing::debug!(requested = %requested, "Working directory traversal, using server cwd");
        return server_cwd.to_path_buf();
    }

    let normalized = normalize(&expanded);
    if normalized.is_absolute() {
        normalized
    } else {
        normalize(&server_cwd.join(normalized))
    }
}

/// Resolve a `cd` target against the directory the command was issued in.
///
/// An empty target means the home directory. `..` is resolved lexically
/// against `base`, so `cd ..` moves up; the result is rejected only if it
/// still escapes above a relative base.
pub fn resolve_cd_target(target: &str, base: &Path) -> Option<PathBuf> {
    let target = unquote(target.trim());
    let expanded = if target.is_empty() {
        expand_home("~")
    } else {
        expand_home(target)
    };

    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base.join(expanded)
    };
    let resolved = normalize(&joined);
    if has_traversal(&resolved) {
        None
    } else {
        Some(resolved)
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a//b/")), PathBuf::from("/a/b"));
        assert_eq!(normalize(Path::new("/..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::from("."));
    }

    #[test]
    fn normalize_keeps_leading_parent_of_relative_path() {
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize(Path::new("a/../../x")), PathBuf::from("../x"));
        assert!(has_traversal(&normalize(Path::new("../../etc"))));
    }

    #[test]
    fn expand_home_variants() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~"), home);
            assert_eq!(expand_home("~/docs"), home.join("docs"));
        }
        // `~user` is not expanded
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
        assert_eq!(expand_home("/tmp"), PathBuf::from("/tmp"));
    }

    #[test]
    fn missing_or_blank_cwd_uses_server_cwd() {
        let server = Path::new("/srv/app");
        assert_eq!(sanitize_working_dir(None, server), server);
        assert_eq!(sanitize_working_dir(Some("  "), server), server);
    }

    #[test]
    fn traversal_falls_back_to_server_cwd() {
        let server = Path::new("/srv/app");
        assert_eq!(sanitize_working_dir(Some("../../etc"), server), server);
        assert_eq!(sanitize_working_dir(Some("/home/../etc"), server), server);
        assert_eq!(sanitize_working_dir(Some("docs/../../x"), server), server);
    }

    #[test]
    fn absolute_cwd_is_normalized() {
        let server = Path::new("/srv/app");
        assert_eq!(
            sanitize_working_dir(Some("/tmp/./notes/"), server),
            PathBuf::from("/tmp/notes")
        );
    }

    #[test]
    fn relative_cwd_is_anchored_at_server_cwd() {
        let server = Path::new("/srv/app");
        assert_eq!(
            sanitize_working_dir(Some("docs"), server),
            PathBuf::from("/srv/app/docs")
        );
    }

    #[test]
    fn cd_target_resolves_relative_to_base() {
        let base = Path::new("/srv/app/docs");
        assert_eq!(
            resolve_cd_target("..", base),
            Some(PathBuf::from("/srv/app"))
        );
        assert_eq!(
            resolve_cd_target("img", base),
            Some(PathBuf::from("/srv/app/docs/img"))
        );
        assert_eq!(resolve_cd_target("/tmp", base), Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn cd_target_strips_quotes() {
        let base = Path::new("/srv");
        assert_eq!(
            resolve_cd_target("\"my notes\"", base),
            Some(PathBuf::from("/srv/my notes"))
        );
        assert_eq!(
            resolve_cd_target("'x'", base),
            Some(PathBuf::from("/srv/x"))
        );
    }

    #[test]
    fn cd_without_target_goes_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolve_cd_target("", Path::new("/tmp")), Some(normalize(&home)));
        }
    }

    #[test]
    fn cd_escaping_relative_base_is_rejected() {
        assert_eq!(resolve_cd_target("../..", Path::new("rel")), None);
    }
}
