//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// ```text
/// /home/user/prototype/test/unit/   ← start
/// /home/user/prototype/testbed.toml ← found!
/// ```
pub fn find_config_file(config_name: &Path, start: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.is_file() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_upward() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::write(root.join("testbed.toml"), "").unwrap();
        let nested = root.join("test/unit");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(Path::new("testbed.toml"), &nested).unwrap();
        assert_eq!(found, root.join("testbed.toml"));
    }

    #[test]
    fn test_find_config_file_missing() {
        let temp = TempDir::new().unwrap();
        assert!(find_config_file(Path::new("no-such-config-xyz.toml"), temp.path()).is_none());
    }

    #[test]
    fn test_find_config_file_absolute() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");
        assert!(find_config_file(&path, temp.path()).is_none());

        fs::write(&path, "").unwrap();
        assert_eq!(find_config_file(&path, Path::new("/")), Some(path));
    }
}
