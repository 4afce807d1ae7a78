use std::path::PathBuf;

use rustc_hash::FxHashMap;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// One debounced delivery from the subscription. Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    pub modified: Vec<PathBuf>,
    pub added: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ChangeBatch {
    pub fn is_empty(&self) -> bool {
        self.modified.is_empty() && self.added.is_empty() && self.removed.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modified.len() + self.added.len() + self.removed.len()
    }

    /// Any addition or removal anywhere in the watched trees.
    pub fn has_structural_change(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

impl From<FxHashMap<PathBuf, ChangeKind>> for ChangeBatch {
    fn from(changes: FxHashMap<PathBuf, ChangeKind>) -> Self {
        let mut batch = Self::default();
        for (path, kind) in changes {
            match kind {
                ChangeKind::Created => batch.added.push(path),
                ChangeKind::Modified => batch.modified.push(path),
                ChangeKind::Removed => batch.removed.push(path),
            }
        }
        batch.modified.sort();
        batch.added.sort();
        batch.removed.sort();
        batch
    }
}
