//! `testbed list`: modules and the fixtures each one would stage.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::{
    config::ProjectConfig,
    suite::{FixtureSet, TestModule, discover_modules},
    utils::plural::plural_count,
};

pub fn list(config: &ProjectConfig) -> Result<()> {
    let modules = discover_modules(&config.paths.tests)
        .with_context(|| format!("failed to read {}", config.paths.tests.display()))?;
    let fixtures = FixtureSet::discover(&config.paths.fixtures)
        .with_context(|| format!("failed to read {}", config.paths.fixtures.display()))?;

    print!("{}", format_listing(&modules, &fixtures));
    println!(
        "{}, {}",
        plural_count(modules.len(), "test module"),
        plural_count(fixtures.len(), "fixture")
    );
    Ok(())
}

fn format_listing(modules: &[TestModule], fixtures: &FixtureSet) -> String {
    let owned = fixtures.by_module(modules);
    let mut out = String::new();

    for module in modules {
        let script = module
            .script
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.push_str(&format!(
            "{} {} {}\n",
            module.output_file_name().bold(),
            "←".dimmed(),
            script
        ));
        for fixture in owned.get(&module.name).into_iter().flatten() {
            out.push_str(&format!("    {}\n", fixture.file_name));
        }
    }
    out
}
