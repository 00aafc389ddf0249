//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Quire navigation engine CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: quire.toml)
    #[arg(short = 'C', long, global = true, default_value = "quire.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Site root that fragment locations are relative to (default: the config's directory)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub root: Option<PathBuf>,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Resolve paths against the route table
    #[command(visible_alias = "r")]
    Resolve {
        /// Paths to resolve (e.g. `/writing/engines/`)
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<String>,

        /// Print descriptors as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load one path through the navigation engine and print the result
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Check fragments for markup the engine cannot use
    #[command(visible_alias = "c")]
    Check {
        #[command(flatten)]
        args: CheckArgs,
    },
}

/// Render command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Path to load, optionally with `#hash`
    #[arg(value_name = "PATH")]
    pub path: String,

    /// Print the enhanced fragment HTML
    #[arg(long)]
    pub html: bool,

    /// Viewport width used for header layout
    #[arg(short, long, default_value_t = 1024.0)]
    pub width: f64,
}

/// Check command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Files or directories to check. If omitted, checks every fragment
    /// referenced by the route table plus the content directory.
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Treat errors as warnings (always exit zero)
    #[arg(long, short = 'w')]
    pub warn_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from(["quire", "resolve", "/", "/writing/x", "--json"]).unwrap();
        match cli.command {
            Commands::Resolve { paths, json } => {
                assert_eq!(paths, ["/", "/writing/x"]);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from("quire.toml"));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["quire", "render", "/projects", "--verbose", "-w", "320"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Render { args } => {
                assert_eq!(args.path, "/projects");
                assert_eq!(args.width, 320.0);
                assert!(!args.html);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_requires_path() {
        assert!(Cli::try_parse_from(["quire", "resolve"]).is_err());
    }
}
