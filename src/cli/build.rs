//! One-shot commands on the output store: `build` and `clean`.

use anyhow::{Result, bail};

use crate::{config::ProjectConfig, log, pipeline::Pipeline};

/// Run the build command and generate every test page once. Output is kept.
pub fn build(config: &ProjectConfig) -> Result<()> {
    let pipeline = Pipeline::new(config);
    pipeline.composer().check_template()?;

    let report = pipeline.rebuild_all()?;
    if !report.is_success() {
        bail!(
            "build finished with errors ({} page(s) generated, {} failed)",
            report.generated.len(),
            report.failures.len()
        );
    }

    log!("build"; "output in {}", config.paths.output.display());
    Ok(())
}

/// Remove the output store.
pub fn clean(config: &ProjectConfig) -> Result<()> {
    let pipeline = Pipeline::new(config);
    let root = pipeline.store().root();
    if !root.exists() {
        log!("clean"; "nothing to remove");
        return Ok(());
    }

    pipeline.store().clear()?;
    log!("clean"; "removed {}", root.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_project;
    use std::fs;

    #[test]
    fn test_build_then_clean() {
        let (_temp, config) = test_project();
        fs::write(config.paths.tests.join("ajax_test.js"), "").unwrap();

        build(&config).unwrap();
        assert!(config.paths.output.join("test_ajax.html").is_file());
        assert!(config.paths.public.join("prototype.js").is_file());

        clean(&config).unwrap();
        assert!(!config.paths.output.exists());
        // published artifact is not part of the output store
        assert!(config.paths.public.join("prototype.js").is_file());

        clean(&config).unwrap();
    }

    #[test]
    fn test_build_reports_failed_command() {
        let (_temp, mut config) = test_project();
        config.build.command = vec!["false".into()];
        assert!(build(&config).is_err());
    }

    #[test]
    fn test_build_rejects_bad_template() {
        let (_temp, config) = test_project();
        fs::write(&config.paths.template, "{{ bogus }}").unwrap();
        assert!(build(&config).is_err());
        assert!(!config.paths.output.exists());
    }
}
