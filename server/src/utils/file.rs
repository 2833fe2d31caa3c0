//! Path helpers for config files and the SQLite database

use std::path::PathBuf;

/// Resolve a user-supplied path to an absolute one
///
/// `~` and `~/...` expand to the home directory; anything relative is joined
/// onto the working directory without canonicalizing (the file may not exist
/// yet). Blank input resolves to the working directory.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let cwd = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if raw.is_empty() {
        return cwd();
    }

    let path = match (raw, dirs::home_dir()) {
        ("~", Some(home)) => home,
        (_, Some(home)) if raw.starts_with("~/") => home.join(&raw[2..]),
        _ => PathBuf::from(raw),
    };

    if path.is_relative() {
        cwd().join(path)
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(expand_path("/var/lib/blog.db"), PathBuf::from("/var/lib/blog.db"));
        assert_eq!(expand_path("  /srv/blog.db  "), PathBuf::from("/srv/blog.db"));
    }

    #[test]
    fn test_relative_joins_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("blogstat.db"), cwd.join("blogstat.db"));
        assert_eq!(expand_path("../shared/blog.db"), cwd.join("../shared/blog.db"));
    }

    #[test]
    fn test_tilde_expands_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_path("~"), home);
        assert_eq!(expand_path("~/.blogstat/blogstat.json"), home.join(".blogstat/blogstat.json"));
    }

    #[test]
    fn test_blank_is_cwd() {
        assert_eq!(expand_path("   "), std::env::current_dir().unwrap());
    }
}
