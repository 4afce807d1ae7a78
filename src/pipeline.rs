//! Batch execution: classify a [`ChangeBatch`], then run the resulting
//! actions one after another against the output store.
//!
//! Every action is isolated. A failing build, a vanished script or a
//! filesystem error is recorded and logged, and the remaining actions of the
//! batch still run.

use std::{collections::BTreeMap, io, path::PathBuf};
use thiserror::Error;

use crate::{
    compose::{Composer, GenerationError},
    config::ProjectConfig,
    debug, log,
    logger::{status_detach, status_error, status_success},
    rebuild::{RebuildError, RebuildReport, RebuildTrigger},
    store::{OutputStore, StoreError},
    suite::{TestModule, discover_modules, find_script},
    utils::plural::plural_count,
    watch::{Action, ChangeBatch, ChangeClassifier, PathClass},
};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Rebuild(#[from] RebuildError),

    #[error("failed to scan test scripts in {path}")]
    Discover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a processed batch did.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub cleared: bool,
    pub rebuild: Option<RebuildReport>,
    pub regenerated: Vec<String>,
    /// Keys with no matching `<key>_test.js` (e.g. a fixture-only change).
    pub skipped: Vec<String>,
    pub errors: Vec<ActionError>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.rebuild.as_ref().is_none_or(RebuildReport::is_success)
    }

    pub fn is_noop(&self) -> bool {
        !self.cleared
            && self.rebuild.is_none()
            && self.regenerated.is_empty()
            && self.errors.is_empty()
    }
}

pub struct Pipeline {
    classifier: ChangeClassifier,
    composer: Composer,
    trigger: RebuildTrigger,
    tests_dir: PathBuf,
}

impl Pipeline {
    pub fn new(config: &ProjectConfig) -> Self {
        let store = OutputStore::new(&config.paths);
        Self {
            classifier: ChangeClassifier::new(&config.paths),
            composer: Composer::new(config, store),
            trigger: RebuildTrigger::new(config),
            tests_dir: config.paths.tests.clone(),
        }
    }

    pub fn store(&self) -> &OutputStore {
        self.composer.store()
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// Full rebuild, reported on the status line.
    pub fn rebuild_all(&self) -> Result<RebuildReport, RebuildError> {
        let report = self.trigger.rebuild_all(&self.composer)?;
        report_rebuild(&report);
        Ok(report)
    }

    /// Classify and execute one batch. Never fails as a whole.
    pub fn process_batch(&self, batch: &ChangeBatch) -> BatchOutcome {
        let plan = self.classifier.classify(batch);
        // build output and per-path logs would be erased by the next status block
        if plan.rebuild || crate::logger::is_verbose() {
            status_detach();
        }
        log_partition(&plan.partition);
        if plan.is_empty() {
            return BatchOutcome::default();
        }
        if plan.clear_store {
            let count = batch.added.len() + batch.removed.len();
            log!("watch"; "{} added or removed, rebuilding", plural_count(count, "file"));
        } else if plan.rebuild {
            log!("watch"; "source changed, rebuilding");
        }

        let mut outcome = BatchOutcome::default();
        for action in plan.actions() {
            self.execute(&action, &mut outcome);
        }

        report_outcome(&outcome);
        outcome
    }

    fn execute(&self, action: &Action, outcome: &mut BatchOutcome) {
        let result = match action {
            Action::ClearStore => self
                .store()
                .clear()
                .map(|()| outcome.cleared = true)
                .map_err(ActionError::from),
            Action::Rebuild => self
                .trigger
                .rebuild_all(&self.composer)
                .map(|report| outcome.rebuild = Some(report))
                .map_err(ActionError::from),
            Action::Regenerate(key) => self.regenerate(key, outcome),
        };

        if let Err(e) = result {
            log!("error"; "{}", e);
            outcome.errors.push(e);
        }
    }

    /// Drop the stale artifacts of the module behind `key`, then regenerate
    /// it from `<key>_test.js`.
    ///
    /// Cleanup goes by staged-name prefix, so it can take files owned by
    /// another module. Those modules are regenerated too.
    fn regenerate(&self, key: &str, outcome: &mut BatchOutcome) -> Result<(), ActionError> {
        let script = find_script(&self.tests_dir, key);
        // `ajax_request_test.js` is module `ajax`
        let target = script
            .as_deref()
            .and_then(TestModule::from_script)
            .map_or_else(|| key.to_string(), |module| module.name);
        let removed = self.store().remove_module_artifacts(&target)?;

        let result = match &script {
            Some(script) => self
                .composer
                .generate(script)
                .map(|_| outcome.regenerated.push(target.clone()))
                .map_err(ActionError::from),
            None => {
                debug!("watch"; "no {}_test.js, nothing to regenerate", key);
                outcome.skipped.push(key.to_string());
                Ok(())
            }
        };

        for module in self.orphaned_by(&target, &removed)? {
            debug!("watch"; "{} lost staged files, regenerating", module.name);
            match self.composer.generate(&module.script) {
                Ok(_) => outcome.regenerated.push(module.name),
                Err(e) => {
                    log!("error"; "{}", e);
                    outcome.errors.push(e.into());
                }
            }
        }

        result
    }

    /// Modules other than `target` that owned one of the `removed` staged
    /// files which was not staged again.
    fn orphaned_by(&self, target: &str, removed: &[String]) -> Result<Vec<TestModule>, ActionError> {
        let staging = self.store().staging();
        let missing: Vec<&str> = removed
            .iter()
            .map(String::as_str)
            .filter(|name| !staging.join(name).exists())
            .collect();
        if missing.is_empty() {
            return Ok(Vec::new());
        }

        let modules = discover_modules(&self.tests_dir).map_err(|source| ActionError::Discover {
            path: self.tests_dir.clone(),
            source,
        })?;

        // last script wins for duplicate module names, as in a full rebuild
        let owners: BTreeMap<String, TestModule> = modules
            .into_iter()
            .filter(|module| module.name != target)
            .filter(|module| missing.iter().any(|name| name.contains(module.name.as_str())))
            .map(|module| (module.name.clone(), module))
            .collect();
        Ok(owners.into_values().collect())
    }
}

fn log_partition(partition: &[(PathBuf, PathClass)]) {
    for (path, class) in partition {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        match class {
            PathClass::Rebuild => debug!("watch"; "{} changed, rebuilding", name),
            PathClass::Regenerate(key) => debug!("watch"; "{} changed, regenerating {}", name, key),
            PathClass::Ignored => debug!("watch"; "ignored {}", path.display()),
        }
    }
}

fn report_rebuild(report: &RebuildReport) {
    if report.is_success() {
        status_success(&format!("built {}", plural_count(report.generated.len(), "test page")));
        return;
    }

    let detail = match &report.build {
        Err(e) => e.to_string(),
        Ok(()) => report
            .failures
            .iter()
            .map(|(script, e)| format!("{}: {}", script.display(), e))
            .collect::<Vec<_>>()
            .join("\n"),
    };
    status_error("build failed", &detail);
}

fn report_outcome(outcome: &BatchOutcome) {
    if let Some(report) = &outcome.rebuild {
        report_rebuild(report);
    }

    if !outcome.errors.is_empty() {
        let detail = outcome
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        status_error(&format!("{} failed", plural_count(outcome.errors.len(), "action")), &detail);
    } else if !outcome.regenerated.is_empty() {
        status_success(&format!("regenerated {}", outcome.regenerated.join(", ")));
    }
}
