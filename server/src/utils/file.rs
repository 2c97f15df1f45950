//! Path helpers for user-supplied file locations

use std::path::{Path, PathBuf};

/// Resolve a user-supplied path to an absolute one.
///
/// `~` and `~/...` expand to the home directory; relative paths are joined
/// onto the current directory. Empty input resolves to the current directory.
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    let expanded = match path {
        "" => PathBuf::new(),
        "~" => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        _ => match (path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        },
    };

    absolutize(&expanded)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) if path.as_os_str().is_empty() => cwd,
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_unchanged() {
        assert_eq!(
            expand_path("/srv/cinetable/movies.json"),
            PathBuf::from("/srv/cinetable/movies.json")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/.cinetable"), home.join(".cinetable"));
        }
    }

    #[test]
    fn relative_paths_join_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("movies.json"), cwd.join("movies.json"));
        assert_eq!(expand_path("  ./data/movies.json "), cwd.join("./data/movies.json"));
    }

    #[test]
    fn empty_is_current_dir() {
        assert_eq!(expand_path(""), std::env::current_dir().unwrap());
    }
}
