//! Test page composition.
//!
//! `generate(script)` stages the script and the fixtures its module owns,
//! builds a [`TestContext`] of references to the staged copies, renders the
//! template and writes `test_<module>.html`.

mod context;
mod template;


pub use context::TestContext;
pub use template::{PlaceholderEngine, RenderError, TemplateEngine};

use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    config::ProjectConfig,
    debug,
    store::{OutputStore, StoreError},
    suite::{FixtureKind, FixtureSet, TestModule},
};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("cannot derive a module name from {}", .0.display())]
    InvalidScriptName(PathBuf),

    #[error("test script {} does not exist", .0.display())]
    ScriptMissing(PathBuf),

    #[error("failed to read template {}", path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read fixtures from {}", path.display())]
    Fixtures {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to render test page for `{module}`")]
    Render {
        module: String,
        #[source]
        source: RenderError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Assembles one test page per test script.
pub struct Composer {
    template: PathBuf,
    fixtures_dir: PathBuf,
    store: OutputStore,
    engine: Box<dyn TemplateEngine>,
}

impl Composer {
    pub fn new(config: &ProjectConfig, store: OutputStore) -> Self {
        Self::with_engine(config, store, Box::new(PlaceholderEngine))
    }

    pub fn with_engine(
        config: &ProjectConfig,
        store: OutputStore,
        engine: Box<dyn TemplateEngine>,
    ) -> Self {
        Self {
            template: config.paths.template.clone(),
            fixtures_dir: config.paths.fixtures.clone(),
            store,
            engine,
        }
    }

    pub fn store(&self) -> &OutputStore {
        &self.store
    }

    /// Read the template and check it only references known fields.
    pub fn check_template(&self) -> Result<(), GenerationError> {
        let source = self.read_template()?;
        self.engine
            .check(&source)
            .map_err(|source| GenerationError::Render {
                module: String::new(),
                source,
            })
    }

    /// Generate `test_<module>.html` for `script`, overwriting any previous page.
    pub fn generate(&self, script: &Path) -> Result<PathBuf, GenerationError> {
        let module = TestModule::from_script(script)
            .ok_or_else(|| GenerationError::InvalidScriptName(script.to_path_buf()))?;
        if !script.is_file() {
            return Err(GenerationError::ScriptMissing(script.to_path_buf()));
        }

        let template = self.read_template()?;
        let fixtures =
            FixtureSet::discover(&self.fixtures_dir).map_err(|source| GenerationError::Fixtures {
                path: self.fixtures_dir.clone(),
                source,
            })?;

        let ctx = self.stage(&module, &fixtures)?;
        let page = self
            .engine
            .render(&template, &ctx)
            .map_err(|source| GenerationError::Render {
                module: module.name.clone(),
                source,
            })?;

        let path = self.store.write_final_artifact(&module.name, page.as_bytes())?;
        debug!("compose"; "generated {}", path.display());
        Ok(path)
    }

    /// Copy the script and every owned fixture into staging and collect
    /// references to the copies.
    fn stage(
        &self,
        module: &TestModule,
        fixtures: &FixtureSet,
    ) -> Result<TestContext, GenerationError> {
        let script_ref = self.store.stage_as(&module.script, &module.staged_script_name())?;
        let mut ctx = TestContext::new(module.title(), &script_ref);

        for fixture in fixtures.matching(&module.name) {
            let reference = self.store.stage(&fixture.path)?;
            match fixture.kind {
                FixtureKind::Stylesheet => ctx.push_stylesheet(&reference),
                FixtureKind::Script => ctx.push_script(&reference),
                FixtureKind::Image => ctx.push_logo(&reference),
                FixtureKind::Markup => {
                    let raw = fs::read(&fixture.path).map_err(|source| GenerationError::Fixtures {
                        path: fixture.path.clone(),
                        source,
                    })?;
                    ctx.push_markup(&String::from_utf8_lossy(&raw));
                }
                FixtureKind::Other => {}
            }
        }

        Ok(ctx)
    }

    fn read_template(&self) -> Result<String, GenerationError> {
        fs::read_to_string(&self.template).map_err(|source| GenerationError::Template {
            path: self.template.clone(),
            source,
        })
    }
}
