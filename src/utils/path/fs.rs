//! Path normalization utilities.
//!
//! Watcher events, config values and CLI overrides all flow through
//! `normalize_path` so that ancestry comparisons see the same spelling
//! (`/private/var` vs `/var` on macOS, `./test` vs `test`).

use std::path::{Path, PathBuf};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first (resolves symlinks, `.`, `..`).
/// Falls back to:
/// - the nearest existing ancestor, canonicalized, with the missing tail
///   re-attached (paths of files that were just removed)
/// - joining with the current directory if relative
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }

    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
    };

    // Removed files can't be canonicalized, but their parent usually can.
    let mut tail = Vec::new();
    let mut current = absolute.as_path();
    while let Some(parent) = current.parent() {
        if let Some(name) = current.file_name() {
            tail.push(name.to_os_string());
        }
        if let Ok(mut base) = parent.canonicalize() {
            for name in tail.iter().rev() {
                base.push(name);
            }
            return base;
        }
        current = parent;
    }

    absolute
}

/// Resolve a config path against the project root, expanding `~`.
///
/// Always returns an absolute path.
pub fn resolve_path(path: &Path, root: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    let expanded = PathBuf::from(shellexpand::tilde(&raw).into_owned());

    if expanded.is_absolute() {
        normalize_path(&expanded)
    } else {
        normalize_path(&root.join(expanded))
    }
}

/// Walk the ancestors of `path` and report whether one of them equals `dir`.
///
/// The path itself counts as its own ancestor, matching `Path::ancestors`.
pub fn has_ancestor(path: &Path, dir: &Path) -> bool {
    path.ancestors().any(|ancestor| ancestor == dir)
}
