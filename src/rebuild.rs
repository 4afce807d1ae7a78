//! Full rebuild: run the library build command, regenerate every test page,
//! publish the library artifact.
//!
//! This is also the initialization path of a watch session.

use rustc_hash::{FxHashMap, FxHashSet};
use std::{io, path::PathBuf};
use thiserror::Error;

use crate::{
    compose::{Composer, GenerationError},
    config::ProjectConfig,
    debug, log,
    store::{StoreError, publish},
    suite::discover_modules,
    utils::exec::{Cmd, EMPTY_FILTER, ExecError, SILENT_FILTER},
};

/// The external build step failed. Recoverable: the previous artifact
/// stays published until a build succeeds.
#[derive(Debug, Error)]
pub enum BuildCommandError {
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("build command succeeded but left no artifact at {}", .0.display())]
    MissingArtifact(PathBuf),
}

/// Errors that abort a rebuild cycle before any page is generated.
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to list test scripts in {}", path.display())]
    Discover {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of one rebuild cycle.
#[derive(Debug)]
pub struct RebuildReport {
    pub build: Result<(), BuildCommandError>,
    /// Module names, in generation order.
    pub generated: Vec<String>,
    pub failures: Vec<(PathBuf, GenerationError)>,
    /// `None` when the build failed and nothing was published.
    pub published: Option<Result<PathBuf, StoreError>>,
}

impl RebuildReport {
    pub fn is_success(&self) -> bool {
        self.build.is_ok()
            && self.failures.is_empty()
            && self.published.as_ref().is_none_or(Result::is_ok)
    }
}

pub struct RebuildTrigger {
    root: PathBuf,
    command: Vec<String>,
    artifact: PathBuf,
    publish_dir: Option<PathBuf>,
    tests_dir: PathBuf,
    vars: FxHashMap<String, String>,
    quiet: bool,
}

impl RebuildTrigger {
    pub fn new(config: &ProjectConfig) -> Self {
        Self {
            root: config.root.clone(),
            command: config.build.command.clone(),
            artifact: config.build.artifact.clone(),
            publish_dir: config.build.publish_dir.clone(),
            tests_dir: config.paths.tests.clone(),
            vars: build_vars(config),
            quiet: config.build.quiet,
        }
    }

    /// Run the build command, regenerate every module, publish the artifact.
    ///
    /// Pages are regenerated even when the build fails: they only depend on
    /// the tests tree. The artifact is published only after a good build.
    pub fn rebuild_all(&self, composer: &Composer) -> Result<RebuildReport, RebuildError> {
        composer.store().ensure()?;

        let build = self.run_build_command();
        if let Err(e) = &build {
            log!("error"; "{}", e);
        }

        let modules = discover_modules(&self.tests_dir).map_err(|source| RebuildError::Discover {
            path: self.tests_dir.clone(),
            source,
        })?;

        let mut generated = Vec::with_capacity(modules.len());
        let mut failures = Vec::new();
        let mut seen = FxHashSet::default();
        for module in &modules {
            if !seen.insert(module.name.as_str()) {
                log!("warning"; "{} overwrites test_{}.html", module.script.display(), module.name);
            }
            match composer.generate(&module.script) {
                Ok(_) => generated.push(module.name.clone()),
                Err(e) => {
                    log!("error"; "{}", e);
                    failures.push((module.script.clone(), e));
                }
            }
        }

        let published = match (&build, &self.publish_dir) {
            (Ok(()), Some(dir)) => Some(publish(&self.artifact, dir)),
            _ => None,
        };
        if let Some(Ok(path)) = &published {
            debug!("build"; "published {}", path.display());
        }

        Ok(RebuildReport {
            build,
            generated,
            failures,
            published,
        })
    }

    fn run_build_command(&self) -> Result<(), BuildCommandError> {
        let resolved = resolve_args(&self.command, &self.vars);
        let name = resolved.first().map(String::as_str).unwrap_or("build");

        if !self.quiet {
            log!("build"; "`{}` running", resolved.join(" "));
        }

        let filter = if self.quiet { &SILENT_FILTER } else { &EMPTY_FILTER };
        let output = Cmd::from_slice(&resolved)
            .cwd(&self.root)
            .envs(&self.vars)
            .filter(filter)
            .run()?;

        if !self.quiet {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stdout = stdout.trim();
            if !stdout.is_empty() {
                println!("{stdout}");
            }
        }

        if !self.artifact.is_file() {
            return Err(BuildCommandError::MissingArtifact(self.artifact.clone()));
        }

        debug!("build"; "`{}` finished", name);
        Ok(())
    }
}

/// `$TESTBED_*` variables exported to the build command.
fn build_vars(config: &ProjectConfig) -> FxHashMap<String, String> {
    let mut vars = FxHashMap::default();
    vars.insert("TESTBED_ROOT".into(), config.root.display().to_string());
    vars.insert(
        "TESTBED_OUTPUT_DIR".into(),
        config.paths.output.display().to_string(),
    );
    vars.insert(
        "TESTBED_ARTIFACT".into(),
        config.build.artifact.display().to_string(),
    );
    vars
}

/// Replace `$TESTBED_*` occurrences in command arguments.
fn resolve_args(args: &[String], vars: &FxHashMap<String, String>) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter().fold(arg.clone(), |acc, (key, value)| {
                acc.replace(&format!("${key}"), value)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::test_project, store::OutputStore};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ProjectConfig, Composer) {
        let (temp, config) = test_project();
        let composer = Composer::new(&config, OutputStore::new(&config.paths));
        (temp, config, composer)
    }

    fn write_test(config: &ProjectConfig, name: &str) {
        fs::write(config.paths.tests.join(name), format!("// {name}")).unwrap();
    }

    #[test]
    fn test_rebuild_all_generates_and_publishes() {
        let (_temp, config, composer) = setup();
        write_test(&config, "ajax_test.js");
        write_test(&config, "dom_test.js");

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();

        assert!(report.is_success());
        assert_eq!(report.generated, vec!["ajax", "dom"]);
        assert!(config.paths.output.join("test_ajax.html").is_file());
        assert!(config.paths.output.join("test_dom.html").is_file());

        let published = config.paths.public.join("prototype.js");
        assert_eq!(report.published.unwrap().unwrap(), published);
        assert!(fs::read_to_string(published).unwrap().contains("Prototype"));
    }

    #[test]
    fn test_rebuild_twice_is_byte_identical() {
        let (_temp, config, composer) = setup();
        write_test(&config, "ajax_test.js");
        fs::write(config.paths.fixtures.join("ajax.css"), "a {}").unwrap();
        let trigger = RebuildTrigger::new(&config);
        let page = config.paths.output.join("test_ajax.html");

        trigger.rebuild_all(&composer).unwrap();
        let first = fs::read(&page).unwrap();
        trigger.rebuild_all(&composer).unwrap();
        assert_eq!(fs::read(&page).unwrap(), first);
    }

    #[test]
    fn test_failed_build_still_generates_but_does_not_publish() {
        let (_temp, mut config, _) = setup();
        config.build.command = vec!["sh".into(), "-c".into(), "echo nope >&2; exit 1".into()];
        let composer = Composer::new(&config, OutputStore::new(&config.paths));
        write_test(&config, "ajax_test.js");

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();

        assert!(matches!(report.build, Err(BuildCommandError::Exec(_))));
        assert!(report.published.is_none());
        assert!(!report.is_success());
        assert_eq!(report.generated, vec!["ajax"]);
        assert!(!config.paths.public.join("prototype.js").exists());
    }

    #[test]
    fn test_missing_artifact() {
        let (_temp, mut config, _) = setup();
        config.build.command = vec!["true".into()];
        let composer = Composer::new(&config, OutputStore::new(&config.paths));

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();
        assert!(matches!(
            report.build,
            Err(BuildCommandError::MissingArtifact(_))
        ));
    }

    #[test]
    fn test_missing_build_program() {
        let (_temp, mut config, _) = setup();
        config.build.command = vec!["definitely-not-a-real-program-xyz".into()];
        let composer = Composer::new(&config, OutputStore::new(&config.paths));

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();
        assert!(matches!(
            report.build,
            Err(BuildCommandError::Exec(ExecError::Spawn { .. }))
        ));
    }

    #[test]
    fn test_command_sees_testbed_vars() {
        let (_temp, mut config, _) = setup();
        config.build.command = vec![
            "sh".into(),
            "-c".into(),
            "mkdir -p dist && echo \"$TESTBED_ROOT\" > $TESTBED_ARTIFACT".into(),
        ];
        let composer = Composer::new(&config, OutputStore::new(&config.paths));

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();
        report.build.unwrap();
        let content = fs::read_to_string(&config.build.artifact).unwrap();
        assert_eq!(content.trim(), config.root.display().to_string());
    }

    #[test]
    fn test_duplicate_module_names_last_wins() {
        let (_temp, config, composer) = setup();
        write_test(&config, "ajax_request_test.js");
        write_test(&config, "ajax_test.js");

        let report = RebuildTrigger::new(&config).rebuild_all(&composer).unwrap();
        assert_eq!(report.generated, vec!["ajax", "ajax"]);

        let staged = fs::read_to_string(config.paths.staging().join("ajax_test.js")).unwrap();
        assert_eq!(staged, "// ajax_test.js");
    }

    #[test]
    fn test_resolve_args() {
        let mut vars = FxHashMap::default();
        vars.insert("TESTBED_ROOT".to_string(), "/proj".to_string());
        let args = vec!["rake".to_string(), "dist[$TESTBED_ROOT]".to_string()];
        assert_eq!(resolve_args(&args, &vars), vec!["rake", "dist[/proj]"]);
    }
}
