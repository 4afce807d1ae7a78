//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Keep a browser-runnable HTML test suite in sync with a JavaScript source tree
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Project root directory (default: the config file's directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Output directory for generated pages (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Config file path (default: testbed.toml)
    #[arg(short = 'C', long, global = true, default_value = "testbed.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build once, then serve the test pages and regenerate them on change
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-regeneration
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },

    /// Run the build command and generate every test page once
    #[command(visible_alias = "b")]
    Build,

    /// Remove the generated output directory
    Clean,

    /// List test modules and the fixtures each one stages
    #[command(visible_alias = "l")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag_is_not_verbose() {
        let err = Cli::try_parse_from(["testbed", "-V"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from([
            "testbed", "serve", "--port", "8080", "--watch", "false", "-i", "0.0.0.0",
        ]);
        match cli.command {
            Commands::Serve {
                interface,
                port,
                watch,
            } => {
                assert_eq!(port, Some(8080));
                assert_eq!(watch, Some(false));
                assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_bare_watch_flag_means_true() {
        let cli = Cli::parse_from(["testbed", "serve", "-w"]);
        assert!(matches!(cli.command, Commands::Serve { watch: Some(true), .. }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["testbed", "build", "-v", "-C", "ci.toml", "-o", "out"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("ci.toml"));
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(matches!(cli.command, Commands::Build));
    }

    #[test]
    fn test_default_config_name() {
        let cli = Cli::parse_from(["testbed", "list"]);
        assert_eq!(cli.config, PathBuf::from("testbed.toml"));
        assert!(cli.root.is_none());
    }
}
