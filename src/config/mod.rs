//! Project configuration management for `testbed.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── build      # [build]
//! │   ├── paths      # [paths]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error.rs       # ConfigError
//! ├── util.rs        # config file discovery
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! The config file is optional. Without one, the current directory is the
//! project root and every section uses its defaults.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{BuildConfig, PathsConfig, ServeConfig, WatchConfig};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::{has_ancestor, normalize_path},
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use util::find_config_file;

/// Root configuration structure representing testbed.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Absolute path to the config file, empty when running on defaults
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory (the external build command runs here)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub serve: ServeConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from `--root` (or cwd) for the config file. The project
    /// root is `--root` if given, else the config file's parent directory,
    /// else the current directory.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let start = cli.root.as_ref().map_or_else(|| cwd.clone(), |r| cwd.join(r));

        let mut config = match find_config_file(&cli.config, &start) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.config_path = normalize_path(&path);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        let root = match (&cli.root, config.config_path.parent()) {
            (Some(_), _) => start,
            (None, Some(parent)) => parent.to_path_buf(),
            _ => cwd,
        };

        config.apply_cli(cli);
        config.finalize(&root);
        config.validate()?;
        config.warn_missing_build_program();

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {} are ignored: {}", display_path, fields.join(", "));
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.paths.output, cli.output.as_ref());

        if let Commands::Serve {
            interface,
            port,
            watch,
        } = &cli.command
        {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
            Self::update_option(&mut self.serve.watch, watch.as_ref());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Anchor every path at `root` and normalize section values.
    pub fn finalize(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.paths.normalize(&root);
        self.build.normalize(&root, &self.paths.public);
        self.watch.normalize();
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate the resolved configuration.
    ///
    /// Missing template or watched roots would leave the pipeline with nothing
    /// to do, so they stop the process before anything is written.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.paths.template.is_file() {
            return Err(ConfigError::MissingTemplate(self.paths.template.clone()));
        }

        for (name, path) in [("source", &self.paths.source), ("tests", &self.paths.tests)] {
            if !path.is_dir() {
                return Err(ConfigError::MissingRoot {
                    name,
                    path: path.clone(),
                });
            }
        }

        if self.build.command.is_empty() {
            return Err(ConfigError::EmptyBuildCommand);
        }

        if self.watch.extensions.is_empty() {
            return Err(ConfigError::NoExtensions);
        }

        // Writing into a watched tree would feed our own output back as changes.
        for watched in [&self.paths.source, &self.paths.tests, &self.paths.fixtures] {
            if has_ancestor(&self.paths.output, watched) || has_ancestor(watched, &self.paths.output)
            {
                return Err(ConfigError::OutputOverlapsWatched {
                    output: self.paths.output.clone(),
                    watched: watched.clone(),
                });
            }
            if let Some(publish) = &self.build.publish_dir
                && has_ancestor(publish, watched)
            {
                return Err(ConfigError::PublishIntoWatched {
                    publish_dir: publish.clone(),
                    watched: watched.clone(),
                });
            }
        }

        Ok(())
    }

    /// A missing build program is recoverable (the watcher keeps going), so
    /// only warn about it.
    fn warn_missing_build_program(&self) {
        let program = self.build.display_name();
        if which::which(program).is_err() && !self.root.join(program).is_file() {
            log!("warning"; "build program `{}` not found in PATH", program);
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Scratch project on disk: empty source/tests/fixtures trees, a template,
/// and a build command that writes `dist/prototype.js`.
#[cfg(test)]
pub fn test_project() -> (tempfile::TempDir, ProjectConfig) {
    let temp = tempfile::TempDir::new().unwrap();
    let root = normalize_path(temp.path());

    for dir in ["src", "test/unit/fixtures", "vendor/testing/views"] {
        fs::create_dir_all(root.join(dir)).unwrap();
    }
    fs::write(
        root.join("vendor/testing/views/template.html"),
        "<html><head><title>{{ title }}</title>{{ css }}{{ js }}{{ logo }}</head>\
         <body>{{ html }}{{ test_file }}</body></html>",
    )
    .unwrap();

    let mut config = ProjectConfig::default();
    config.build.command = vec![
        "sh".into(),
        "-c".into(),
        "mkdir -p dist && echo 'var Prototype = {};' > dist/prototype.js".into(),
    ];
    config.finalize(&root);

    (temp, config)
}
