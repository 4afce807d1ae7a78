use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::{ChangeBatch, ChangeKind};

/// Reconcile raw debounced changes with the filesystem and build a batch.
///
/// The watcher may report stale kinds (Created for a file already gone,
/// Removed for a file that an atomic save put back). Directories are dropped:
/// only files are classified downstream.
pub(super) fn settle(mut changes: FxHashMap<PathBuf, ChangeKind>) -> ChangeBatch {
    correct_by_existence(&mut changes);
    changes.retain(|path, kind| *kind == ChangeKind::Removed || path.is_file());
    ChangeBatch::from(changes)
}

fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
    let paths: Vec<_> = changes.keys().cloned().collect();
    for path in paths {
        let kind = changes[&path];
        let exists = path.exists();
        match kind {
            ChangeKind::Created if !exists => {
                crate::debug!("watch"; "discard created (gone): {}", path.display());
                changes.remove(&path);
            }
            ChangeKind::Modified if !exists => {
                crate::debug!("watch"; "upgrade modified->removed: {}", path.display());
                changes.insert(path, ChangeKind::Removed);
            }
            ChangeKind::Removed if exists => {
                crate::debug!("watch"; "downgrade removed->modified: {}", path.display());
                changes.insert(path, ChangeKind::Modified);
            }
            _ => {}
        }
    }
}
