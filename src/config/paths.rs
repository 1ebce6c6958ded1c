//! Path expansion for config values.

use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::resolver::compile_static_regex;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_static_regex(r"%([A-Za-z_][A-Za-z0-9_()]*)%|\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
});

/// Expands `%VAR%`, `${VAR}` and `$VAR`; unknown variables are left as written.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    ENV_VAR_RE
        .replace_all(value, |caps: &Captures<'_>| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str());
            env::var(name).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Replaces a leading `~` (alone or followed by a separator) with the home directory.
#[must_use]
pub fn expand_home(value: &str) -> PathBuf {
    let Some(rest) = value.strip_prefix('~') else {
        return PathBuf::from(value);
    };
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\')) {
        return PathBuf::from(value);
    }
    match home_dir() {
        Some(home) => home.join(rest.trim_start_matches(['/', '\\'])),
        None => PathBuf::from(value),
    }
}

/// Collapses `.` and `..` components without touching the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Resolves a config path value against the config file's directory.
///
/// Environment variables and `~` are expanded first; absolute results are
/// returned as-is.
#[must_use]
pub fn resolve_config_path(base_dir: &Path, value: &str) -> PathBuf {
    let expanded = expand_home(&expand_env_vars(value.trim()));
    if expanded.is_absolute() {
        return expanded;
    }
    normalize_lexically(&base_dir.join(expanded))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_env_vars_known_and_unknown() {
        let home = env::var("PATH").unwrap();
        assert_eq!(expand_env_vars("$PATH/x"), format!("{home}/x"));
        assert_eq!(expand_env_vars("${PATH}/x"), format!("{home}/x"));
        assert_eq!(expand_env_vars("%PATH%/x"), format!("{home}/x"));
        assert_eq!(
            expand_env_vars("%IDMQ_SURELY_UNSET_VAR%/IDM"),
            "%IDMQ_SURELY_UNSET_VAR%/IDM"
        );
    }

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/./c/../d")),
            PathBuf::from("/a/b/d")
        );
    }

    #[test]
    fn test_resolve_config_path_relative_to_base() {
        let base = Path::new("/cfg/dir");
        assert_eq!(
            resolve_config_path(base, "./downloads"),
            PathBuf::from("/cfg/dir/downloads")
        );
        assert_eq!(
            resolve_config_path(base, "../state.json"),
            PathBuf::from("/cfg/state.json")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_config_path_absolute_kept() {
        assert_eq!(
            resolve_config_path(Path::new("/cfg"), "/var/log/idm.txt"),
            PathBuf::from("/var/log/idm.txt")
        );
    }

    #[test]
    fn test_expand_home_only_leading_tilde() {
        assert_eq!(expand_home("a/~b"), PathBuf::from("a/~b"));
        assert_eq!(expand_home("~user/x"), PathBuf::from("~user/x"));
    }
}
