//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("template file `{0}` not found")]
    MissingTemplate(PathBuf),

    #[error("{name} directory `{path}` not found")]
    MissingRoot { name: &'static str, path: PathBuf },

    #[error("`build.command` is empty")]
    EmptyBuildCommand,

    #[error("`watch.extensions` is empty, nothing would ever be reported")]
    NoExtensions,

    #[error("output directory `{output}` overlaps watched directory `{watched}`")]
    OutputOverlapsWatched { output: PathBuf, watched: PathBuf },

    #[error("artifact directory `{publish_dir}` is inside watched directory `{watched}`")]
    PublishIntoWatched { publish_dir: PathBuf, watched: PathBuf },
}
