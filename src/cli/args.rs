//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// pack - build container images from application source
///
/// Runs the detect, analyze, build and export lifecycle phases against the
/// local container daemon.
#[derive(Parser, Debug)]
#[command(name = "pack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "PACK_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build an image from application source
    Build(BuildArgs),

    /// Inspect or clear an application's build cache
    Cache(CacheArgs),

    /// Check the container runtime
    Status,

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Name of the image to produce
    pub repo_name: String,

    /// Application directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Stack whose phase images run the build (e.g. heroku-18)
    #[arg(short, long)]
    pub stack: Option<String>,

    /// Build without the container daemon (not supported)
    #[arg(long)]
    pub no_daemon: bool,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the cache directory for an application
    Path {
        /// Application directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Remove the cache directory for an application
    Clear {
        /// Application directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., runtime.binary)
        key: String,
        /// Value to set
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_build() {
        let cli = Cli::parse_from(["pack", "build", "myapp", "--stack", "heroku-18", "-p", "/src/app1"]);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.repo_name, "myapp");
                assert_eq!(args.stack.as_deref(), Some("heroku-18"));
                assert_eq!(args.path, Some(PathBuf::from("/src/app1")));
                assert!(!args.no_daemon);
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn cli_parses_no_daemon() {
        let cli = Cli::parse_from(["pack", "build", "myapp", "--no-daemon"]);
        match cli.command {
            Commands::Build(args) => {
                assert!(args.no_daemon);
                assert!(args.stack.is_none());
                assert!(args.path.is_none());
            }
            _ => panic!("expected Build command"),
        }
    }

    #[test]
    fn cli_requires_repo_name() {
        assert!(Cli::try_parse_from(["pack", "build"]).is_err());
    }

    #[test]
    fn cli_parses_cache_path() {
        let cli = Cli::parse_from(["pack", "cache", "path", "--path", "app"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Path { path },
            }) => assert_eq!(path, Some(PathBuf::from("app"))),
            _ => panic!("expected cache path"),
        }
    }

    #[test]
    fn cli_parses_status() {
        let cli = Cli::parse_from(["pack", "status"]);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn cli_verbose_levels() {
        let cli = Cli::parse_from(["pack", "status"]);
        assert_eq!(cli.verbose, 0);

        let cli = Cli::parse_from(["pack", "-v", "status"]);
        assert_eq!(cli.verbose, 1);

        let cli = Cli::parse_from(["pack", "-vv", "status"]);
        assert_eq!(cli.verbose, 2);
    }
}
