//! `[build]` section configuration.
//!
//! Describes the opaque "build the library from source" step.
//!
//! # Example
//!
//! ```toml
//! [build]
//! command = ["rake", "dist"]        # run from the project root
//! artifact = "dist/prototype.js"    # file the command leaves behind
//! publish_dir = "vendor/testing/public"  # where the artifact is copied (default: paths.public)
//! quiet = false                     # hide command output on success
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::resolve_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Command and arguments producing the library artifact.
    pub command: Vec<String>,

    /// Artifact produced by `command`, relative to the project root.
    pub artifact: PathBuf,

    /// Directory receiving a copy of the artifact. Defaults to `paths.public`.
    pub publish_dir: Option<PathBuf>,

    /// Suppress command output on success.
    pub quiet: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            command: vec!["rake".into(), "dist".into()],
            artifact: "dist/prototype.js".into(),
            publish_dir: None,
            quiet: false,
        }
    }
}

impl BuildConfig {
    pub fn normalize(&mut self, root: &Path, public: &Path) {
        self.artifact = resolve_path(&self.artifact, root);
        self.publish_dir = Some(match self.publish_dir.take() {
            Some(dir) => resolve_path(&dir, root),
            None => public.to_path_buf(),
        });
    }

    /// Display name for logging (`command[0]`).
    pub fn display_name(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("build")
    }
}
