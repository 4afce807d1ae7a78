//! Change classification: which batch entries need a full rebuild, which
//! regenerate a single module, which are irrelevant.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use super::types::ChangeBatch;
use crate::{config::PathsConfig, suite::changed_module_key, utils::path::has_ancestor};

/// Classification of a single modified path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathClass {
    /// Under the source tree.
    Rebuild,
    /// Under the fixtures or tests tree. Holds the module key.
    Regenerate(String),
    Ignored,
}

/// What to do for one batch, deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Remove the whole output store first (any addition or removal).
    pub clear_store: bool,
    pub rebuild: bool,
    pub regenerate: BTreeSet<String>,
    /// Every classified path, in batch order.
    pub partition: Vec<(PathBuf, PathClass)>,
}

/// A single step executed by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ClearStore,
    Rebuild,
    Regenerate(String),
}

impl Plan {
    /// Actions in execution order. A rebuild supersedes every regenerate.
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.clear_store {
            actions.push(Action::ClearStore);
        }
        if self.rebuild {
            actions.push(Action::Rebuild);
        } else {
            actions.extend(self.regenerate.iter().cloned().map(Action::Regenerate));
        }
        actions
    }

    pub fn is_empty(&self) -> bool {
        !self.clear_store && !self.rebuild && self.regenerate.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ChangeClassifier {
    source: PathBuf,
    tests: PathBuf,
    fixtures: PathBuf,
}

impl ChangeClassifier {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            source: paths.source.clone(),
            tests: paths.tests.clone(),
            fixtures: paths.fixtures.clone(),
        }
    }

    /// Classify one modified path by its ancestors.
    pub fn classify_path(&self, path: &Path) -> PathClass {
        if has_ancestor(path, &self.source) {
            return PathClass::Rebuild;
        }
        if has_ancestor(path, &self.fixtures) || has_ancestor(path, &self.tests) {
            return match changed_module_key(path) {
                Some(key) => PathClass::Regenerate(key),
                None => PathClass::Ignored,
            };
        }
        PathClass::Ignored
    }

    /// Build the plan for a batch.
    ///
    /// Modified paths are classified one by one. Any added or removed path,
    /// wherever it is, clears the store and forces a full rebuild.
    pub fn classify(&self, batch: &ChangeBatch) -> Plan {
        let mut plan = Plan::default();

        for path in &batch.modified {
            let class = self.classify_path(path);
            match &class {
                PathClass::Rebuild => plan.rebuild = true,
                PathClass::Regenerate(key) => {
                    plan.regenerate.insert(key.clone());
                }
                PathClass::Ignored => {}
            }
            plan.partition.push((path.clone(), class));
        }

        for path in batch.added.iter().chain(&batch.removed) {
            plan.partition.push((path.clone(), PathClass::Rebuild));
        }

        if batch.has_structural_change() {
            plan.clear_store = true;
            plan.rebuild = true;
        }

        plan
    }
}
