//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "src"                                  # library sources (rebuild on change)
//! tests = "test/unit"                             # *_test.js scripts
//! fixtures = "test/unit/fixtures"                 # css/js/gif/html fixtures
//! public = "vendor/testing/public"                # served over HTTP
//! output = "vendor/testing/public/tests"          # generated test pages
//! template = "vendor/testing/views/template.html" # test page template
//! ```
//!
//! Relative paths are resolved against the project root.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::resolve_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Library source tree. Any modification here triggers a full rebuild.
    pub source: PathBuf,

    /// Directory holding the unit test scripts.
    pub tests: PathBuf,

    /// Directory holding fixtures shared by the test scripts.
    pub fixtures: PathBuf,

    /// Directory served by the HTTP front end.
    pub public: PathBuf,

    /// Generated test pages. Removed on shutdown.
    pub output: PathBuf,

    /// Test page template.
    pub template: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "src".into(),
            tests: "test/unit".into(),
            fixtures: "test/unit/fixtures".into(),
            public: "vendor/testing/public".into(),
            output: "vendor/testing/public/tests".into(),
            template: "vendor/testing/views/template.html".into(),
        }
    }
}

impl PathsConfig {
    /// Resolve every path against `root`.
    pub fn normalize(&mut self, root: &Path) {
        for path in [
            &mut self.source,
            &mut self.tests,
            &mut self.fixtures,
            &mut self.public,
            &mut self.output,
            &mut self.template,
        ] {
            *path = resolve_path(path, root);
        }
    }

    /// Staging subdirectory inside the output directory.
    pub fn staging(&self) -> PathBuf {
        self.output.join("tmp")
    }

    /// URL path of the output directory as seen from the public root.
    ///
    /// `vendor/testing/public/tests` under `vendor/testing/public` → `/tests`.
    /// Falls back to `/` when output lives outside the public directory.
    pub fn output_url(&self) -> String {
        let relative = self.output.strip_prefix(&self.public).unwrap_or(Path::new(""));
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", parts.join("/"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.tests, PathBuf::from("test/unit"));
        assert_eq!(config.paths.fixtures, PathBuf::from("test/unit/fixtures"));
        assert_eq!(config.paths.output, PathBuf::from("vendor/testing/public/tests"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\nsource = \"lib\"\ntests = \"spec\"");
        assert_eq!(config.paths.source, PathBuf::from("lib"));
        assert_eq!(config.paths.tests, PathBuf::from("spec"));
        // untouched fields keep their defaults
        assert_eq!(config.paths.public, PathBuf::from("vendor/testing/public"));
    }

    #[test]
    fn test_output_url() {
        let paths = PathsConfig {
            public: "/repo/public".into(),
            output: "/repo/public/tests".into(),
            ..PathsConfig::default()
        };
        assert_eq!(paths.output_url(), "/tests");

        let outside = PathsConfig {
            public: "/repo/public".into(),
            output: "/repo/out".into(),
            ..PathsConfig::default()
        };
        assert_eq!(outside.output_url(), "/");
    }

    #[test]
    fn test_staging_dir() {
        let paths = PathsConfig {
            output: "/repo/public/tests".into(),
            ..PathsConfig::default()
        };
        assert_eq!(paths.staging(), PathBuf::from("/repo/public/tests/tmp"));
    }
}
